//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters must implement.

pub mod answer_backend;
pub mod conversation_logger;
pub mod judge;
pub mod progress;
