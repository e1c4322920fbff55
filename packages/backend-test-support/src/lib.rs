//! Backend test support utilities
//!
//! Shared by unit and integration tests: one-time tracing setup and
//! assertions for the Problem Details error contract.

pub mod logging;
pub mod problem_details;
