//! Vendor adapters implementing [`AnswerBackend`]
//!
//! The vendor set is closed: [`VendorBackend`] has one variant per wire
//! format, and [`build_roster`] turns the configuration into the
//! [`BackendRoster`] the orchestrator picks from.

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod settings;
pub mod sse;

pub use anthropic::AnthropicBackend;
pub use error::ProviderError;
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use settings::{BackendSettings, ProviderKind};

use crate::config::FileConfig;
use async_trait::async_trait;
use ogiri_application::{AnswerBackend, AnswerRequest, BackendRoster, GatewayError, StreamHandle};
use ogiri_domain::BackendId;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One AI participant, dispatched by vendor
pub enum VendorBackend {
    Anthropic(AnthropicBackend),
    OpenAi(OpenAiBackend),
    Gemini(GeminiBackend),
}

impl VendorBackend {
    /// Build the adapter for `backend` from resolved settings
    pub fn new(client: Client, settings: BackendSettings) -> Self {
        match ProviderKind::for_backend(settings.backend) {
            ProviderKind::Anthropic => {
                VendorBackend::Anthropic(AnthropicBackend::new(client, settings))
            }
            ProviderKind::OpenAi | ProviderKind::DeepSeek => {
                VendorBackend::OpenAi(OpenAiBackend::new(client, settings))
            }
            ProviderKind::Gemini => VendorBackend::Gemini(GeminiBackend::new(client, settings)),
        }
    }

    /// Resolve settings for `backend` and build its adapter
    pub fn from_config(
        config: &FileConfig,
        backend: BackendId,
        client: Client,
    ) -> error::Result<Self> {
        let settings = BackendSettings::resolve(config, backend)?;
        Ok(Self::new(client, settings))
    }

    fn inner(&self) -> &dyn AnswerBackend {
        match self {
            VendorBackend::Anthropic(b) => b,
            VendorBackend::OpenAi(b) => b,
            VendorBackend::Gemini(b) => b,
        }
    }
}

#[async_trait]
impl AnswerBackend for VendorBackend {
    fn id(&self) -> BackendId {
        self.inner().id()
    }

    fn display_name(&self) -> &str {
        self.inner().display_name()
    }

    async fn open_stream(&self, request: &AnswerRequest<'_>) -> Result<StreamHandle, GatewayError> {
        self.inner().open_stream(request).await
    }
}

/// Longest wait for a TCP/TLS handshake with a vendor
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build adapters for every selected backend.
///
/// A backend whose setup fails (missing key, bad URL) is recorded as
/// unavailable with the reason; picking it fails that turn only.
pub fn build_roster(config: &FileConfig, backends: &[BackendId]) -> error::Result<BackendRoster> {
    let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let mut roster = BackendRoster::new();
    for &backend in backends {
        match VendorBackend::from_config(config, backend, client.clone()) {
            Ok(vendor) => {
                debug!(backend = %backend, "Backend ready");
                roster.insert(Arc::new(vendor));
            }
            Err(e) => {
                info!(backend = %backend, "Backend unavailable: {}", e);
                roster.mark_unavailable(backend, e.to_string());
            }
        }
    }
    Ok(roster)
}
