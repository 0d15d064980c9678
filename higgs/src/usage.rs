//! Token usage reported by the service.
//!
//! Maps the `usage` object of chat-completion responses:
//! `prompt_tokens` / `completion_tokens` / `total_tokens` plus the audio
//! token breakdowns.

use serde::{Deserialize, Serialize};

/// Detailed breakdown of prompt tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTokensDetails {
    /// Cached tokens that were reused.
    #[serde(default)]
    pub cached_tokens: u32,

    /// Audio tokens in the input.
    #[serde(default)]
    pub audio_tokens: u32,
}

/// Detailed breakdown of completion tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTokensDetails {
    /// Audio tokens in the output.
    #[serde(default)]
    pub audio_tokens: u32,

    /// Text tokens in the output.
    #[serde(default)]
    pub text_tokens: u32,
}

/// Token usage statistics for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    #[serde(default, alias = "prompt_tokens")]
    pub input_tokens: u32,

    /// Number of tokens generated.
    #[serde(default, alias = "completion_tokens")]
    pub output_tokens: u32,

    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,

    /// Prompt token breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,

    /// Completion token breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

impl Usage {
    /// Create usage from input and output counts.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
            prompt_tokens_details: None,
            completion_tokens_details: None,
        }
    }

    /// Audio tokens generated, if reported.
    #[must_use]
    pub fn output_audio_tokens(&self) -> Option<u32> {
        self.completion_tokens_details.map(|d| d.audio_tokens)
    }
}
