//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendId`]: the AI vendors that can answer (Claude, ChatGPT, Gemini, DeepSeek)
//! - [`topic::Topic`]: a validated ogiri prompt
//! - [`error::DomainError`]: domain-level errors

pub mod backend;
pub mod error;
pub mod string;
pub mod topic;
