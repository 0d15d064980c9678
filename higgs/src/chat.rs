//! Chat completion request/response types and the provider trait.
//!
//! This module provides:
//! - [`ChatRequest`]: a conversation plus generation parameters
//! - [`ChatResponse`]: a complete non-streaming result
//! - [`ChatProvider`]: the seam between the synthesis flows and the service
//!
//! # Example
//!
//! ```rust,ignore
//! use higgs::prelude::*;
//!
//! let request = ChatRequest::new("higgs-audio-generation-Hackathon")
//!     .system("Convert the following text from the user into speech.")
//!     .user("Hello!")
//!     .modalities([Modality::Text, Modality::Audio])
//!     .audio(AudioOutput::new(AudioFormat::Pcm16));
//!
//! let mut stream = provider.chat_stream(&request).await?;
//! ```

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::audio::{AudioFormat, GeneratedAudio};
use crate::error::{LlmError, Result};
use crate::message::Message;
use crate::stream::{StopReason, StreamChunk};
use crate::usage::Usage;

/// Output modality requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Text output.
    Text,
    /// Audio output.
    Audio,
}

/// Requested audio output encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOutput {
    /// Output format, e.g. `pcm16` for streaming.
    pub format: AudioFormat,
    /// Optional named voice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl AudioOutput {
    /// Request the given output format.
    #[must_use]
    pub const fn new(format: AudioFormat) -> Self {
        Self {
            format,
            voice: None,
        }
    }

    /// Select a named voice.
    #[must_use]
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier. Empty means the provider default.
    #[serde(default)]
    pub model: String,

    /// Conversation messages, in order.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Requested output modalities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<Modality>,

    /// Requested audio output encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioOutput>,

    /// Maximum output token budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Stop sequences, forwarded to the service as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,

    /// Extra top-level body fields (e.g. `top_k`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_body: Option<Map<String, Value>>,
}

impl ChatRequest {
    /// Creates a new request with the specified model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Creates a request with messages.
    #[must_use]
    pub fn with_messages(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    /// Adds a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Adds a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Adds an arbitrary message.
    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the output modalities.
    #[must_use]
    pub fn modalities(mut self, modalities: impl IntoIterator<Item = Modality>) -> Self {
        self.modalities = modalities.into_iter().collect();
        self
    }

    /// Sets the audio output encoding.
    #[must_use]
    pub fn audio(mut self, audio: AudioOutput) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Sets the output token budget.
    #[must_use]
    pub const fn max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = Some(tokens);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets top_p.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets top_k, carried in the extra body.
    #[must_use]
    pub fn top_k(self, top_k: u32) -> Self {
        self.extra("top_k", top_k)
    }

    /// Sets stop sequences.
    #[must_use]
    pub fn stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = Some(stop.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables streaming.
    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Adds an extra top-level body field.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_body
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Whether audio output was requested.
    #[must_use]
    pub fn wants_audio(&self) -> bool {
        self.modalities.contains(&Modality::Audio) || self.audio.is_some()
    }
}

/// Response from a non-streaming chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant message (text part).
    pub message: Message,
    /// Decoded audio payload, if the model produced one.
    pub audio: Option<GeneratedAudio>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token usage.
    pub usage: Option<Usage>,
    /// Model that served the request.
    pub model: Option<String>,
    /// Response identifier.
    pub id: Option<String>,
}

impl ChatResponse {
    /// Text content of the response.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message.text()
    }

    /// Audio payload of the response.
    #[must_use]
    pub const fn audio(&self) -> Option<&GeneratedAudio> {
        self.audio.as_ref()
    }

    /// Take the audio payload, failing if there is none.
    ///
    /// # Errors
    ///
    /// Returns a response format error if the response carries no audio.
    pub fn into_audio(self) -> Result<GeneratedAudio> {
        self.audio
            .ok_or_else(|| LlmError::response_format("an audio payload", "a text-only response").into())
    }
}

/// Boxed stream of chunks returned by [`ChatProvider::chat_stream`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// A chat-completion shaped audio generation service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send a request and return the ordered chunk stream.
    ///
    /// The stream is lazy, finite and cannot be restarted.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream>;

    /// Provider name, used in logs and errors.
    fn provider_name(&self) -> &'static str;

    /// Model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;
}

/// Boxed provider.
pub type BoxedChatProvider = Box<dyn ChatProvider>;
