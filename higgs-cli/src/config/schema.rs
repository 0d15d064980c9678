//! Configuration schema definitions.

use higgs::audio::PcmSpec;
use higgs::llms::BosonConfig;
use higgs::synthesis::{DEFAULT_SCENE, StreamingSpeechRequest, VoiceCloneRequest};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HiggsConfig {
    /// Service endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Voice-cloning sampling parameters.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Streaming synthesis settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Service endpoint settings. The API key is only read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the chat completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds; absent disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    BosonConfig::DEFAULT_BASE_URL.to_owned()
}

fn default_model() -> String {
    BosonConfig::DEFAULT_MODEL.to_owned()
}

#[allow(clippy::unnecessary_wraps)]
const fn default_timeout() -> Option<u64> {
    Some(120)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Voice-cloning sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling breadth.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Output token budget.
    #[serde(default = "default_clone_tokens")]
    pub max_completion_tokens: u32,

    /// Acoustic scene description.
    #[serde(default = "default_scene")]
    pub scene: String,
}

const fn default_temperature() -> f32 {
    1.0
}

const fn default_top_p() -> f32 {
    0.95
}

const fn default_top_k() -> u32 {
    50
}

const fn default_clone_tokens() -> u32 {
    4096
}

fn default_scene() -> String {
    DEFAULT_SCENE.to_owned()
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_completion_tokens: default_clone_tokens(),
            scene: default_scene(),
        }
    }
}

/// Streaming synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Sample rate of the streamed PCM, in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output token budget.
    #[serde(default = "default_stream_tokens")]
    pub max_completion_tokens: u32,
}

const fn default_sample_rate() -> u32 {
    PcmSpec::DEFAULT_SAMPLE_RATE
}

const fn default_stream_tokens() -> u32 {
    300
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_completion_tokens: default_stream_tokens(),
        }
    }
}

impl HiggsConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            issues.push(ConfigIssue::error(
                "api.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.api.model.trim().is_empty() {
            issues.push(ConfigIssue::error("api.model", "Model must not be empty"));
        }

        if self.api.timeout_secs == Some(0) {
            issues.push(ConfigIssue::warning(
                "api.timeout_secs",
                "Timeout is 0, requests will time out immediately",
            ));
        }

        if !(0.0..=2.0).contains(&self.sampling.temperature) {
            issues.push(ConfigIssue::error(
                "sampling.temperature",
                "Temperature must be between 0 and 2",
            ));
        }

        if !(self.sampling.top_p > 0.0 && self.sampling.top_p <= 1.0) {
            issues.push(ConfigIssue::error(
                "sampling.top_p",
                "top_p must be in (0, 1]",
            ));
        }

        if self.sampling.max_completion_tokens == 0 {
            issues.push(ConfigIssue::error(
                "sampling.max_completion_tokens",
                "Token budget must be at least 1",
            ));
        }

        if self.stream.max_completion_tokens == 0 {
            issues.push(ConfigIssue::error(
                "stream.max_completion_tokens",
                "Token budget must be at least 1",
            ));
        }

        if self.stream.sample_rate == 0 {
            issues.push(ConfigIssue::error(
                "stream.sample_rate",
                "Sample rate must be at least 1 Hz",
            ));
        } else if self.stream.sample_rate != PcmSpec::DEFAULT_SAMPLE_RATE {
            issues.push(ConfigIssue::warning(
                "stream.sample_rate",
                "The service streams 24000 Hz audio; other rates change playback speed",
            ));
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment overrides into the configuration.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("BOSON_BASE_URL") {
            self.api.base_url = url;
        }

        if let Ok(model) = std::env::var("BOSON_MODEL") {
            self.api.model = model;
        }

        self
    }

    /// Client configuration for the given API key.
    #[must_use]
    pub fn boson_config(&self, api_key: impl Into<String>) -> BosonConfig {
        let config = BosonConfig::new(api_key)
            .with_base_url(self.api.base_url.clone())
            .with_model(self.api.model.clone());

        match self.api.timeout_secs {
            Some(secs) => config.with_timeout(secs),
            None => config.without_timeout(),
        }
    }

    /// Apply the sampling section to a voice-cloning request.
    #[must_use]
    pub fn apply_sampling(&self, request: VoiceCloneRequest) -> VoiceCloneRequest {
        request
            .with_model(self.api.model.clone())
            .with_scene(self.sampling.scene.clone())
            .with_temperature(self.sampling.temperature)
            .with_top_p(self.sampling.top_p)
            .with_top_k(self.sampling.top_k)
            .with_max_completion_tokens(self.sampling.max_completion_tokens)
    }

    /// Apply the stream section to a streaming request.
    #[must_use]
    pub fn apply_stream(&self, request: StreamingSpeechRequest) -> StreamingSpeechRequest {
        request
            .with_model(self.api.model.clone())
            .with_max_completion_tokens(self.stream.max_completion_tokens)
            .with_pcm(PcmSpec::mono_16bit(self.stream.sample_rate))
    }
}

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "sampling.top_p").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Prevents synthesis from running.
    Error,
    /// Suspicious but usable.
    Warning,
}
