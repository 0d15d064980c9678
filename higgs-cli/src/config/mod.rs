//! Configuration management for the `higgs` command.
//!
//! Settings come from, in increasing priority:
//! 1. Default values
//! 2. Config file (`~/.higgs/config.toml`)
//! 3. Environment variables (`BOSON_BASE_URL`, `BOSON_MODEL`)
//!
//! The API key is never stored in the file; it is read from `BOSON_API_KEY`.

mod schema;

pub use schema::{HiggsConfig, IssueLevel};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".higgs")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path.
///
/// A missing file yields the defaults. Environment overrides are applied
/// and the result is validated.
pub async fn load_config_from(path: &Path) -> ConfigResult<HiggsConfig> {
    let config = if path.exists() {
        let content = tokio::fs::read_to_string(path).await?;
        let config: HiggsConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config file");
        config
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
        HiggsConfig::default()
    };

    let config = config.with_env();
    for issue in config.validate() {
        match issue.level {
            IssueLevel::Error => return Err(ConfigError::InvalidValue(issue.to_string())),
            IssueLevel::Warning => tracing::warn!("{issue}"),
        }
    }

    Ok(config)
}

/// Write configuration to a specific path, creating parent directories.
pub async fn save_config_to(config: &HiggsConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::schema::{SamplingConfig, StreamConfig};
    use super::*;
    use assert_fs::TempDir;

    #[test]
    fn test_default_paths() {
        let cfg_dir = default_config_dir();
        assert!(cfg_dir.ends_with(".higgs"));

        let cfg_path = config_path();
        assert!(cfg_path.ends_with("config.toml"));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.sampling, SamplingConfig::default());
        assert_eq!(config.stream, StreamConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = HiggsConfig::default();
        config.sampling.top_k = 30;
        config.stream.max_completion_tokens = 600;
        save_config_to(&config, &path).await.unwrap();

        let loaded = load_config_from(&path).await.unwrap();
        assert_eq!(loaded.sampling.top_k, 30);
        assert_eq!(loaded.stream.max_completion_tokens, 600);
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[sampling]\ntop_p = 1.5\n").unwrap();
        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref m) if m.contains("sampling.top_p")));

        std::fs::write(&path, "[sampling\n").unwrap();
        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
