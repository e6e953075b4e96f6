//! Game configuration from TOML (`[game]` and `[system]` sections)

use super::issue::ConfigIssue;
use ogiri_domain::{BackendId, MAX_ROUNDS};
use serde::{Deserialize, Serialize};

/// Default per-call deadline in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Raw game configuration from TOML
///
/// # Example
///
/// ```toml
/// [game]
/// backends = ["gemini", "claude", "chatgpt"]
/// turns_per_backend = 3
/// timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGameConfig {
    /// Backend keys taking part, in order
    pub backends: Vec<String>,
    /// How many times each backend answers in a batch game
    pub turns_per_backend: usize,
    /// Per-call deadline
    pub timeout_seconds: u64,
}

impl Default for FileGameConfig {
    fn default() -> Self {
        Self {
            backends: BackendId::default_backends()
                .iter()
                .map(|b| b.as_str().to_string())
                .collect(),
            turns_per_backend: MAX_ROUNDS as usize,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl FileGameConfig {
    /// Parse backend keys, collecting issues for unknown or duplicate ones
    pub fn parse_backends(&self) -> (Vec<BackendId>, Vec<ConfigIssue>) {
        let mut backends = Vec::new();
        let mut issues = Vec::new();
        for key in &self.backends {
            match key.parse::<BackendId>() {
                Ok(id) if backends.contains(&id) => issues.push(ConfigIssue::warning(
                    "game.backends",
                    format!("'{}' is listed more than once", key),
                )),
                Ok(id) => backends.push(id),
                Err(e) => issues.push(ConfigIssue::error("game.backends", e.to_string())),
            }
        }
        if self.backends.is_empty() {
            issues.push(ConfigIssue::error(
                "game.backends",
                "at least one backend must be selected",
            ));
        }
        (backends, issues)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_backends().1;
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                "game.timeout_seconds",
                "timeout_seconds cannot be 0",
            ));
        }
        if self.turns_per_backend == 0 {
            issues.push(ConfigIssue::error(
                "game.turns_per_backend",
                "turns_per_backend cannot be 0",
            ));
        }
        issues
    }
}

/// Raw system prompt configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemConfig {
    /// Replaces the built-in ogiri rules when set
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_defaults() {
        let config = FileGameConfig::default();
        let (backends, issues) = config.parse_backends();
        assert_eq!(
            backends,
            vec![BackendId::Gemini, BackendId::Claude, BackendId::ChatGpt]
        );
        assert!(issues.is_empty());
        assert_eq!(config.turns_per_backend, 3);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_parse_backends_reports_unknown() {
        let config = FileGameConfig {
            backends: vec!["claude".into(), "llama".into(), "Claude".into()],
            ..Default::default()
        };
        let (backends, issues) = config.parse_backends();
        assert_eq!(backends, vec![BackendId::Claude]);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("llama"));
        assert!(!issues[1].is_error());
    }

    #[test]
    fn test_validate_zero_values() {
        let config = FileGameConfig {
            backends: vec![],
            turns_per_backend: 0,
            timeout_seconds: 0,
        };
        let fields: Vec<String> = config.validate().into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "game.backends",
                "game.timeout_seconds",
                "game.turns_per_backend"
            ]
        );
    }
}
