//! Configuration issues reported by [`FileConfig::validate`](super::FileConfig::validate)

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `models.claude.temperature`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every fatal issue found in a configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {}", render(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn render(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display() {
        let issue = ConfigIssue::error("game.timeout_seconds", "must be greater than 0");
        assert_eq!(issue.to_string(), "game.timeout_seconds: must be greater than 0");
        assert!(issue.is_error());
        assert!(!ConfigIssue::warning("x", "y").is_error());
    }

    #[test]
    fn test_validation_error_lists_issues() {
        let err = ConfigValidationError {
            issues: vec![
                ConfigIssue::error("game.backends", "unknown backend 'bard'"),
                ConfigIssue::error("game.turns_per_backend", "must be greater than 0"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: game.backends: unknown backend 'bard'; \
             game.turns_per_backend: must be greater than 0"
        );
    }
}
