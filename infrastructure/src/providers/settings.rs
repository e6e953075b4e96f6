//! Resolved per-backend settings
//!
//! Combines the `[models.<backend>]` table with the vendor's
//! `[providers.<vendor>]` table and the API key from the environment.

use super::error::{ProviderError, Result};
use crate::config::{FileConfig, FileProviderConfig, FileProvidersConfig};
use ogiri_domain::BackendId;

/// The vendor APIs a backend can be served by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Gemini,
    DeepSeek,
}

impl ProviderKind {
    pub fn for_backend(backend: BackendId) -> Self {
        match backend {
            BackendId::Claude => ProviderKind::Anthropic,
            BackendId::ChatGpt => ProviderKind::OpenAi,
            BackendId::Gemini => ProviderKind::Gemini,
            BackendId::DeepSeek => ProviderKind::DeepSeek,
        }
    }

    /// Name of the `[providers.*]` table
    pub fn config_key(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GOOGLE_API_KEY",
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::DeepSeek => "https://api.deepseek.com",
        }
    }

    fn file_config<'a>(&self, providers: &'a FileProvidersConfig) -> &'a FileProviderConfig {
        match self {
            ProviderKind::Anthropic => &providers.anthropic,
            ProviderKind::OpenAi => &providers.openai,
            ProviderKind::Gemini => &providers.gemini,
            ProviderKind::DeepSeek => &providers.deepseek,
        }
    }
}

/// Everything an adapter needs to call its vendor for one backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub backend: BackendId,
    pub display_name: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_key: String,
    /// Base URL without a trailing slash
    pub base_url: String,
}

impl BackendSettings {
    /// Resolve settings, reading the API key from the process environment
    pub fn resolve(config: &FileConfig, backend: BackendId) -> Result<Self> {
        Self::resolve_with(config, backend, |name| std::env::var(name).ok())
    }

    /// Resolve settings with a custom environment lookup
    pub fn resolve_with(
        config: &FileConfig,
        backend: BackendId,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let kind = ProviderKind::for_backend(backend);
        let provider = kind.file_config(&config.providers);
        let model = config.models.for_backend(backend);

        let env_var = provider
            .api_key_env
            .clone()
            .unwrap_or_else(|| kind.default_api_key_env().to_string());
        let api_key = provider
            .api_key
            .clone()
            .or_else(|| env(&env_var))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey {
                backend,
                env_var: env_var.clone(),
                provider: kind.config_key(),
            })?;

        let base_url = provider
            .base_url
            .as_deref()
            .unwrap_or(kind.default_base_url())
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ProviderError::InvalidBaseUrl {
                url: base_url,
                reason: "must start with http:// or https://".to_string(),
            });
        }

        Ok(Self {
            backend,
            display_name: model.display_name_for(backend),
            model_name: model.model_name,
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            api_key,
            base_url,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Settings pointing at a local mock server
    pub(crate) fn settings_for(backend: BackendId, base_url: &str) -> BackendSettings {
        let mut config = FileConfig::default();
        let provider = match ProviderKind::for_backend(backend) {
            ProviderKind::Anthropic => &mut config.providers.anthropic,
            ProviderKind::OpenAi => &mut config.providers.openai,
            ProviderKind::Gemini => &mut config.providers.gemini,
            ProviderKind::DeepSeek => &mut config.providers.deepseek,
        };
        provider.api_key = Some("test-key".to_string());
        provider.base_url = Some(base_url.to_string());
        BackendSettings::resolve_with(&config, backend, |_| None).unwrap()
    }

    #[test]
    fn test_resolve_reads_env_key() {
        let config = FileConfig::default();
        let settings = BackendSettings::resolve_with(&config, BackendId::Gemini, |name| {
            (name == "GOOGLE_API_KEY").then(|| "g-key".to_string())
        })
        .unwrap();
        assert_eq!(settings.api_key, "g-key");
        assert_eq!(
            settings.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(settings.model_name, "gemini-2.0-flash");
        assert_eq!(settings.display_name, "Gemini");
    }

    #[test]
    fn test_resolve_custom_env_var_and_url() {
        let mut config = FileConfig::default();
        config.providers.deepseek.api_key_env = Some("MY_KEY".to_string());
        config.providers.deepseek.base_url = Some("http://localhost:8080/".to_string());
        let settings = BackendSettings::resolve_with(&config, BackendId::DeepSeek, |name| {
            (name == "MY_KEY").then(|| "d-key".to_string())
        })
        .unwrap();
        assert_eq!(settings.api_key, "d-key");
        assert_eq!(settings.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_missing_key() {
        let config = FileConfig::default();
        let err = BackendSettings::resolve_with(&config, BackendId::Claude, |_| {
            Some("   ".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::MissingApiKey { ref env_var, .. } if env_var == "ANTHROPIC_API_KEY"
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = FileConfig::default();
        config.providers.openai.base_url = Some("api.openai.com".to_string());
        config.providers.openai.api_key = Some("k".to_string());
        let err = BackendSettings::resolve_with(&config, BackendId::ChatGpt, |_| None).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_provider_kind_mapping() {
        assert_eq!(
            ProviderKind::for_backend(BackendId::DeepSeek).default_base_url(),
            "https://api.deepseek.com"
        );
        assert_eq!(ProviderKind::for_backend(BackendId::ChatGpt).config_key(), "openai");
    }
}
