//! Presentation layer for ai-ogiri
//!
//! This crate contains CLI definitions, the terminal judge, output
//! formatters, progress reporters, and the interactive REPL.

pub mod cli;
pub mod interactive;
pub mod judge;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use interactive::GameRepl;
pub use judge::{LineJudge, StdinJudge};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{SpinnerReporter, StreamingReporter};
