//! Infrastructure layer for ai-ogiri
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: vendor HTTP backends, configuration file
//! loading, and the JSONL transcript logger.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig, Severity};
pub use logging::JsonlTranscriptLogger;
pub use providers::{
    AnthropicBackend, BackendSettings, GeminiBackend, OpenAiBackend, ProviderError, ProviderKind,
    VendorBackend, build_roster,
};
