//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Credentials and endpoint for one vendor API.
///
/// Unset fields fall back to the vendor's defaults (see
/// `providers::ProviderKind` in this crate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    /// Base URL override (proxies, compatible gateways, tests)
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Anthropic API settings (Claude)
    pub anthropic: FileProviderConfig,
    /// OpenAI API settings (ChatGPT)
    pub openai: FileProviderConfig,
    /// Google Generative Language API settings (Gemini)
    pub gemini: FileProviderConfig,
    /// DeepSeek API settings (OpenAI-compatible)
    pub deepseek: FileProviderConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_deserialize() {
        let toml_str = r#"
[providers.deepseek]
api_key_env = "MY_DEEPSEEK_KEY"
base_url = "http://localhost:9000"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.providers.deepseek.api_key_env.as_deref(),
            Some("MY_DEEPSEEK_KEY")
        );
        assert_eq!(
            config.providers.deepseek.base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.providers.anthropic, FileProviderConfig::default());
    }
}
