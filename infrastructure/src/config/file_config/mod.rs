//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod game;
mod issue;
mod models;
mod output;
mod providers;

pub use game::{DEFAULT_TIMEOUT_SECONDS, FileGameConfig, FileSystemConfig};
pub use issue::{ConfigIssue, ConfigValidationError, Severity};
pub use models::{FileModelConfig, FileModelsConfig};
pub use output::{FileLogConfig, FileOutputConfig, FileOutputFormat};
pub use providers::{FileProviderConfig, FileProvidersConfig};

use ogiri_application::GameParams;
use ogiri_domain::{BackendId, PromptTemplate};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// System prompt override
    pub system: FileSystemConfig,
    /// Backend selection and pacing
    pub game: FileGameConfig,
    /// Per-backend generation parameters
    pub models: FileModelsConfig,
    /// Vendor credentials and endpoints
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Transcript settings
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.game.validate();
        issues.extend(self.models.validate());

        if let Some(prompt) = &self.system.prompt
            && prompt.trim().is_empty()
        {
            issues.push(ConfigIssue::warning(
                "system.prompt",
                "system prompt is empty; backends will get no rules",
            ));
        }

        issues
    }

    /// Whether any issue is fatal
    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(ConfigIssue::is_error)
    }

    /// Split issues into warnings (returned) and errors (the `Err` case)
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError { issues: errors })
        }
    }

    /// Selected backends (unknown keys are skipped; see [`Self::validate`])
    pub fn backends(&self) -> Vec<BackendId> {
        self.game.parse_backends().0
    }

    /// System prompt, or the built-in ogiri rules
    pub fn system_prompt(&self) -> String {
        self.system
            .prompt
            .clone()
            .unwrap_or_else(|| PromptTemplate::default_system().to_string())
    }

    /// Game parameters for the application layer
    pub fn game_params(&self) -> GameParams {
        GameParams::default()
            .with_system_prompt(self.system_prompt())
            .with_turns_per_backend(self.game.turns_per_backend)
            .with_timeout_seconds(Some(self.game.timeout_seconds).filter(|s| *s > 0))
    }
}
