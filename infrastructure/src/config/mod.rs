//! Configuration file loading for ai-ogiri
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `OGIRI_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ogiri.toml` or `./.ogiri.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ai-ogiri/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, DEFAULT_TIMEOUT_SECONDS, FileConfig, FileGameConfig,
    FileLogConfig, FileModelConfig, FileModelsConfig, FileOutputConfig, FileOutputFormat,
    FileProviderConfig, FileProvidersConfig, FileSystemConfig, Severity,
};
pub use loader::ConfigLoader;
