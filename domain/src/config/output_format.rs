//! Output format value object

use serde::{Deserialize, Serialize};

/// How final results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable results announcement (default)
    #[default]
    Text,
    /// JSON output
    Json,
}
