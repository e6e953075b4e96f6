//! CLI command definitions

use clap::{Parser, ValueEnum};
use ogiri_domain::BackendId;
use std::path::PathBuf;

/// Output format for batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Results announcement
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for ogiri_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ogiri_domain::OutputFormat::Text,
            OutputFormat::Json => ogiri_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for ai-ogiri
#[derive(Parser, Debug)]
#[command(name = "ai-ogiri")]
#[command(author, version, about = "AI Ogiri - Several AIs answer a comedy topic, you judge")]
#[command(long_about = r#"
AI Ogiri lets several AI backends take turns answering an ogiri (大喜利)
topic. Every backend sees the answers given so far, and you award points
to the ones you like.

Batch mode (default) reads the topic from stdin until EOF, plays a shuffled
schedule and prints the results. Interactive mode (-i) opens a prompt where
you ask for answers one at a time.

Configuration files are loaded from (in priority order):
1. OGIRI_* environment variables (nested keys with __)
2. --config <path>     Explicit config file
3. ./ogiri.toml        Project-level config
4. ~/.config/ai-ogiri/config.toml   Global config

Example:
  echo "夏" | ai-ogiri
  ai-ogiri -b claude -b deepseek --turns-per-backend 2
  ai-ogiri -i
"#)]
pub struct Cli {
    /// Start interactive mode
    #[arg(short, long)]
    pub interactive: bool,

    /// Backends to play (can be specified multiple times)
    #[arg(short, long = "backend", value_name = "BACKEND")]
    pub backends: Vec<BackendId>,

    /// How many times each backend answers in batch mode
    #[arg(long, value_name = "N")]
    pub turns_per_backend: Option<usize>,

    /// Deadline for a single answer, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Seed for the turn order (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Result format for batch mode
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append a JSONL transcript of the game to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ai-ogiri"]);
        assert!(!cli.interactive);
        assert!(cli.backends.is_empty());
        assert_eq!(cli.format, None);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_backends_and_flags() {
        let cli = Cli::parse_from([
            "ai-ogiri",
            "-b",
            "Claude",
            "--backend",
            "deepseek",
            "--turns-per-backend",
            "2",
            "--seed",
            "7",
            "--format",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.backends, vec![BackendId::Claude, BackendId::DeepSeek]);
        assert_eq!(cli.turns_per_backend, Some(2));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["ai-ogiri", "-b", "bard"]).is_err());
    }
}
