//! Checked entry points for fortified libc calls.
//!
//! Every `__*_chk` function receives the declared capacity of its buffer,
//! consults the membrane, and either performs exactly what the unchecked
//! primitive would or writes a diagnostic and aborts. `usize::MAX` as a
//! capacity means "unknown" and turns buffer checks into pass-through.
//!
//! In release builds the entry points are exported unmangled so the cdylib
//! can stand in for the libc fortify symbols.

pub use fortify_membrane;

#[macro_use]
mod macros;

pub mod fatal;
pub mod fcntl_abi;
pub mod poll_abi;
pub mod prop_hooks;
pub mod runtime_policy;
pub mod socket_abi;
pub mod stdio_abi;
pub mod string_abi;
pub mod unistd_abi;
