//! Boson client configuration.

use crate::error::{LlmError, Result};

/// Configuration for the Boson client.
#[derive(Clone)]
pub struct BosonConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl BosonConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://hackathon.boson.ai/v1";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "higgs-audio-generation-Hackathon";
    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &'static str = "BOSON_API_KEY";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `BOSON_API_KEY` - Required API key
    /// - `BOSON_BASE_URL` - Optional base URL
    /// - `BOSON_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `BOSON_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| LlmError::auth("boson", "BOSON_API_KEY environment variable not set"))?;

        let base_url =
            std::env::var("BOSON_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let model = std::env::var("BOSON_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs: Some(120),
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Disables the request timeout, for long streams.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }
}

impl Default for BosonConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(120),
        }
    }
}

impl std::fmt::Debug for BosonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BosonConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
