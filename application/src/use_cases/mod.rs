//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod interactive;
pub mod round_orchestrator;
pub mod run_batch;
