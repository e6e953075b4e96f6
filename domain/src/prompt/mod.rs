//! Prompt templates shared by every vendor backend.

pub mod template;

pub use template::PromptTemplate;
