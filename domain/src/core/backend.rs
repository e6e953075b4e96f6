//! Backend identifier value object

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The AI vendors that can take part in a game (Value Object)
///
/// This is a closed set: the score ledger is keyed by it, so every
/// identifier that reaches the orchestrator is known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendId {
    Claude,
    ChatGpt,
    Gemini,
    DeepSeek,
}

impl BackendId {
    /// All known backends, in declaration order
    pub const ALL: [BackendId; 4] = [
        BackendId::Claude,
        BackendId::ChatGpt,
        BackendId::Gemini,
        BackendId::DeepSeek,
    ];

    /// Get the string key for this backend (used in config and transcripts)
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Claude => "claude",
            BackendId::ChatGpt => "chatgpt",
            BackendId::Gemini => "gemini",
            BackendId::DeepSeek => "deepseek",
        }
    }

    /// Human-facing name used when no display name is configured
    pub fn default_display_name(&self) -> &'static str {
        match self {
            BackendId::Claude => "Claude",
            BackendId::ChatGpt => "ChatGPT",
            BackendId::Gemini => "Gemini",
            BackendId::DeepSeek => "DeepSeek",
        }
    }

    pub fn avatar(&self) -> &'static str {
        match self {
            BackendId::Claude => "🟣",
            BackendId::ChatGpt => "🟢",
            BackendId::Gemini => "🔵",
            BackendId::DeepSeek => "🟡",
        }
    }

    /// Get the default set of backends for a game
    pub fn default_backends() -> Vec<BackendId> {
        vec![BackendId::Gemini, BackendId::Claude, BackendId::ChatGpt]
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(BackendId::Claude),
            "chatgpt" | "gpt" | "openai" => Ok(BackendId::ChatGpt),
            "gemini" => Ok(BackendId::Gemini),
            "deepseek" => Ok(BackendId::DeepSeek),
            other => Err(DomainError::UnknownBackend(other.to_string())),
        }
    }
}

impl Serialize for BackendId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackendId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
