//! Error types for the `higgs` command.

use crate::config::ConfigError;

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded or saved.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The API key is not set.
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    /// Synthesis failed.
    #[error(transparent)]
    Higgs(#[from] higgs::Error),

    /// Runtime setup failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
