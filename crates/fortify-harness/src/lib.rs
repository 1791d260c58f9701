//! Conformance tooling for the fortify layer.
//!
//! Fixture packs describe checked calls as plain values; the runner feeds
//! them through the membrane's decision function and compares outcomes.
//! Captured stderr from fortified processes can be aggregated into a
//! [`ViolationLogReport`].

pub mod diff;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod verify;

pub use fixtures::{FixtureCase, FixtureSet};
pub use report::{ConformanceReport, ViolationLogReport};
pub use runner::TestRunner;
