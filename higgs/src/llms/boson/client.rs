//! Boson API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::ChatRequest;
use crate::error::{LlmError, Result};
use crate::message::{Content, ContentPart, Message};

use super::config::BosonConfig;
use super::types::{
    ChatCompletionRequest, ErrorResponse, WireContent, WireContentPart, WireInputAudio,
    WireMessage,
};

/// Boson API client.
#[derive(Debug, Clone)]
pub struct Boson {
    pub(crate) config: Arc<BosonConfig>,
    pub(crate) client: Client,
}

impl Boson {
    pub(crate) const PROVIDER: &'static str = "boson";

    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the API key is empty.
    pub fn new(config: BosonConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth(Self::PROVIDER, "API key is required").into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `BOSON_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let config = BosonConfig::from_env()?;
        Self::new(config)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build an authenticated JSON request.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Convert a message to the wire format.
    pub(crate) fn convert_message(msg: &Message) -> WireMessage {
        let content = msg.content.as_ref().map(|c| match c {
            Content::Text(text) => WireContent::Text(text.clone()),
            Content::Parts(parts) => WireContent::Array(
                parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => WireContentPart::Text { text: text.clone() },
                        ContentPart::InputAudio { input_audio } => WireContentPart::InputAudio {
                            input_audio: WireInputAudio {
                                data: input_audio.data.clone(),
                                format: input_audio.format.as_str().to_owned(),
                            },
                        },
                    })
                    .collect(),
            ),
        });

        WireMessage {
            role: msg.role.as_str().to_owned(),
            content,
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(&self, request: &ChatRequest) -> ChatCompletionRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages: request.messages.iter().map(Self::convert_message).collect(),
            modalities: request.modalities.clone(),
            audio: request.audio.clone(),
            max_completion_tokens: request.max_completion_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop.clone(),
            stream: request.stream,
            extra: request.extra_body.clone().unwrap_or_default(),
        }
    }

    /// Parse an error response body.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(body) {
            let error = error_response.error;

            return match status {
                401 | 403 => LlmError::auth(Self::PROVIDER, error.message),
                429 => LlmError::rate_limited(Self::PROVIDER),
                _ => match error.code.or(error.error_type) {
                    Some(code) => LlmError::provider_code(Self::PROVIDER, code, error.message),
                    None => LlmError::provider(Self::PROVIDER, error.message),
                },
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::{AudioFormat, InputAudio};
    use crate::chat::Modality;
    use crate::error::{Error, LlmErrorKind};

    fn client() -> Boson {
        Boson::new(BosonConfig::new("test-key").with_base_url("http://localhost:9/v1/")).unwrap()
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = Boson::new(BosonConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Llm(ref e) if e.kind == LlmErrorKind::Auth));
    }

    #[test]
    fn chat_url_trims_slash() {
        assert_eq!(client().chat_url(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn audio_message_conversion() {
        let msg = Message::assistant_audio(InputAudio::new("AQID", AudioFormat::Wav));
        let json = serde_json::to_value(Boson::convert_message(&msg)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "role": "assistant",
                "content": [{"type": "input_audio", "input_audio": {"data": "AQID", "format": "wav"}}]
            })
        );
    }

    #[test]
    fn body_uses_default_model_and_extra() {
        let request = ChatRequest::new("")
            .user("hello")
            .modalities([Modality::Text, Modality::Audio])
            .top_k(50)
            .stop(["<|audio_eos|>"]);
        let body = client().build_body(&request);

        assert_eq!(body.model, BosonConfig::DEFAULT_MODEL);
        assert!(!body.stream);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["top_k"], 50);
        assert_eq!(json["stop"][0], "<|audio_eos|>");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn parse_error_kinds() {
        let body = r#"{"error":{"message":"invalid key","type":"invalid_request_error"}}"#;
        assert_eq!(Boson::parse_error(401, body).kind, LlmErrorKind::Auth);
        assert_eq!(Boson::parse_error(429, body).kind, LlmErrorKind::RateLimited);

        let err = Boson::parse_error(400, body);
        assert_eq!(err.kind, LlmErrorKind::Provider);
        assert_eq!(err.code.as_deref(), Some("invalid_request_error"));

        let err = Boson::parse_error(502, "<html>bad gateway</html>");
        assert_eq!(err.kind, LlmErrorKind::HttpStatus);
        assert_eq!(err.code.as_deref(), Some("502"));
    }
}
