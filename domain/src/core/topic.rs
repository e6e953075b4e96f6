//! Topic value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The ogiri prompt every backend answers (Value Object)
///
/// Set once per game. Leading and trailing whitespace is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Create a topic, rejecting empty or whitespace-only input
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyTopic);
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Topic {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Topic::new(s)
    }
}

impl TryFrom<&str> for Topic {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Topic::new(s)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_creation() {
        let topic = Topic::new("夏").unwrap();
        assert_eq!(topic.content(), "夏");
    }

    #[test]
    fn test_topic_is_trimmed() {
        let topic = Topic::new("  恋愛\n").unwrap();
        assert_eq!(topic.content(), "恋愛");
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(Topic::new(""), Err(DomainError::EmptyTopic));
        assert_eq!(Topic::new(" \n\t"), Err(DomainError::EmptyTopic));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Topic>("\"\"").is_err());
        let topic: Topic = serde_json::from_str("\"冬\"").unwrap();
        assert_eq!(topic.to_string(), "冬");
    }
}
