//! Test tooling for the storage proposal: lab specs describing simulated
//! systems, a partitioning engine working on them, and product fixtures.

pub mod engine;
pub mod errors;
pub mod spec;

pub use engine::SimulatedEngine;
pub use errors::{Result, TestingError};
pub use spec::LabSpec;
