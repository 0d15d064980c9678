//! Boson ChatProvider implementation.

use async_trait::async_trait;
use futures::StreamExt;

use crate::audio::{AudioFormat, GeneratedAudio};
use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ChunkStream};
use crate::error::{Error, LlmError, Result};
use crate::message::{Content, Message, Role};
use crate::stream::StopReason;

use super::client::Boson;
use super::stream::{LineBuffer, parse_sse_lines};
use super::types::ChatCompletionResponse;

impl Boson {
    /// Parse the response into a [`ChatResponse`].
    ///
    /// `requested` is the audio format asked for in the request; it is used
    /// when the service omits the format tag on the payload.
    pub(crate) fn parse_response(
        response: ChatCompletionResponse,
        requested: Option<AudioFormat>,
    ) -> Result<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        let stop_reason = choice
            .finish_reason
            .as_deref()
            .map(StopReason::parse)
            .unwrap_or_default();

        let audio = match choice.message.audio {
            Some(payload) => {
                let format = payload
                    .format
                    .as_deref()
                    .and_then(AudioFormat::parse)
                    .or(requested)
                    .unwrap_or_default();
                let mut audio = GeneratedAudio::from_base64(&payload.data, format)?;
                audio.id = payload.id;
                audio.transcript = payload.transcript;
                audio.expires_at = payload.expires_at;
                Some(audio)
            }
            None => None,
        };

        let message = Message {
            role: Role::Assistant,
            content: choice.message.content.map(Content::Text),
        };

        Ok(ChatResponse {
            message,
            audio,
            stop_reason,
            usage: response.usage,
            model: response.model,
            id: response.id,
        })
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response> {
        let url = self.chat_url();
        let mut body = self.build_body(request);
        body.stream = stream;

        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            stream,
            "sending chat completion request"
        );

        let response = self.build_request(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for Boson {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.send(request, false).await?;

        let response_text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid chat completion response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;

        Self::parse_response(parsed, request.audio.as_ref().map(|a| a.format))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        let response = self.send(request, true).await?;
        let mut byte_stream = response.bytes_stream().boxed();

        let stream = async_stream::stream! {
            let mut lines = LineBuffer::default();

            while let Some(chunk) = byte_stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(Error::from(LlmError::stream(e.to_string())));
                        return;
                    }
                };

                for item in parse_sse_lines(lines.push(&bytes)) {
                    let failed = item.is_err();
                    yield item;
                    if failed {
                        return;
                    }
                }
            }

            for item in parse_sse_lines(lines.finish()) {
                yield item;
            }
        };

        Ok(Box::pin(stream))
    }

    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}
