//! Judge adapters implementing [`ogiri_application::JudgePort`]

pub mod stdin;

pub use stdin::{LineJudge, StdinJudge};
