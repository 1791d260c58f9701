//! Decision layer for checked libc calls.
//!
//! Each intercepted primitive carries the declared capacity of its
//! destination. The ABI layer gathers the runtime facts of the call into a
//! [`Request`] and asks [`decide`] whether the call may proceed. A violation
//! is always fatal; this crate only describes it, the ABI crate terminates.

pub mod capacity;
pub mod config;
pub mod decision;
pub mod diagnostic;
pub mod primitive;
pub mod request;
pub mod scan;
pub mod violation;

pub use capacity::{BufferDescriptor, Capacity, DeclaredCapacity, UNKNOWN_CAPACITY};
pub use config::DiagnosticFormat;
pub use decision::{Decision, FD_SETSIZE, decide};
pub use diagnostic::{StackFmt, ViolationRecord};
pub use primitive::{Family, Primitive};
pub use request::{Extent, Operation, Request};
pub use scan::ScanSource;
pub use violation::{Violation, ViolationKind};
