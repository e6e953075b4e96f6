//! Error types for the vendor adapters

use ogiri_application::GatewayError;
use ogiri_domain::BackendId;
use thiserror::Error;

/// Result type alias for provider setup
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while setting up a vendor backend
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key for {backend} not found: set {env_var} or providers.{provider}.api_key")]
    MissingApiKey {
        backend: BackendId,
        env_var: String,
        provider: &'static str,
    },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Configuration(err.to_string())
    }
}
