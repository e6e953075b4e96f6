//! Per-backend model configuration from TOML (`[models.<backend>]` sections)

use super::issue::ConfigIssue;
use ogiri_domain::BackendId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generation parameters for one backend
///
/// # Example
///
/// ```toml
/// [models.claude]
/// model_name = "claude-3-5-haiku-20241022"
/// max_tokens = 1000
/// temperature = 0.9
/// display_name = "Claude"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Vendor model identifier
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Name shown to the judge; falls back to the backend's default
    pub display_name: Option<String>,
}

impl FileModelConfig {
    /// Built-in parameters for a backend
    pub fn builtin(backend: BackendId) -> Self {
        let model_name = match backend {
            BackendId::Claude => "claude-3-5-haiku-20241022",
            BackendId::ChatGpt => "gpt-4o-mini",
            BackendId::Gemini => "gemini-2.0-flash",
            BackendId::DeepSeek => "deepseek-chat",
        };
        Self {
            model_name: model_name.to_string(),
            max_tokens: 1000,
            temperature: 0.9,
            display_name: Some(backend.default_display_name().to_string()),
        }
    }

    /// Display name, or the backend's default when unset
    pub fn display_name_for(&self, backend: BackendId) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(backend.default_display_name())
            .to_string()
    }
}

/// All `[models.*]` tables, keyed by backend key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileModelsConfig(pub BTreeMap<String, FileModelConfig>);

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self(
            BackendId::ALL
                .iter()
                .map(|b| (b.as_str().to_string(), FileModelConfig::builtin(*b)))
                .collect(),
        )
    }
}

impl FileModelsConfig {
    /// Parameters for `backend`, or the built-in ones when not configured
    pub fn for_backend(&self, backend: BackendId) -> FileModelConfig {
        self.0
            .iter()
            .find(|(key, _)| key.parse::<BackendId>().ok() == Some(backend))
            .map(|(_, config)| config.clone())
            .unwrap_or_else(|| FileModelConfig::builtin(backend))
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (key, config) in &self.0 {
            let field = |name: &str| format!("models.{}.{}", key, name);
            if let Err(e) = key.parse::<BackendId>() {
                issues.push(ConfigIssue::error(format!("models.{}", key), e.to_string()));
                continue;
            }
            if config.model_name.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    field("model_name"),
                    "model name cannot be empty",
                ));
            }
            if !(0.0..=2.0).contains(&config.temperature) {
                issues.push(ConfigIssue::error(
                    field("temperature"),
                    format!(
                        "temperature must be between 0.0 and 2.0 (got {})",
                        config.temperature
                    ),
                ));
            }
            if config.max_tokens == 0 {
                issues.push(ConfigIssue::error(
                    field("max_tokens"),
                    "max_tokens cannot be 0",
                ));
            }
        }
        issues
    }
}
