//! Wire types for the chat completions endpoint.
//!
//! These map directly onto the JSON bodies exchanged with the service and
//! are internal to the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chat::{AudioOutput, Modality};
use crate::usage::Usage;

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<Modality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub stream: bool,
    /// Extra body fields, merged into the top level.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Message format on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<WireContent>,
}

/// Message content variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Array(Vec<WireContentPart>),
}

/// Content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireContentPart {
    Text { text: String },
    InputAudio { input_audio: WireInputAudio },
}

/// Audio attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireInputAudio {
    /// Base64-encoded audio data.
    pub data: String,
    /// Format tag, e.g. "wav".
    pub format: String,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub audio: Option<ResponseAudio>,
}

/// Audio payload embedded in a response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseAudio {
    #[serde(default)]
    pub id: Option<String>,
    /// Base64-encoded audio bytes.
    pub data: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Streaming chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Stream choice.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Option<StreamDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Stream delta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub audio: Option<StreamAudioDelta>,
}

/// Audio fragment inside a stream delta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamAudioDelta {
    /// Base64-encoded raw PCM bytes.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: Option<String>,
}

// Some servers send numeric codes.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;

    #[test]
    fn request_flattens_extra_body() {
        let mut extra = Map::new();
        extra.insert("top_k".to_owned(), Value::from(50));
        let body = ChatCompletionRequest {
            model: "higgs".to_owned(),
            messages: vec![WireMessage {
                role: "user".to_owned(),
                content: Some(WireContent::Text("hi".to_owned())),
            }],
            modalities: vec![Modality::Text, Modality::Audio],
            audio: Some(AudioOutput::new(AudioFormat::Pcm16)),
            max_completion_tokens: Some(300),
            temperature: None,
            top_p: None,
            stop: None,
            stream: true,
            extra,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["top_k"], 50);
        assert_eq!(json["modalities"], serde_json::json!(["text", "audio"]));
        assert_eq!(json["audio"]["format"], "pcm16");
        assert_eq!(json["stream"], true);
        assert!(json.get("temperature").is_none());
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn response_with_audio_deserializes() {
        let json = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "higgs-audio-generation-Hackathon",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "audio": {"id": "audio_1", "data": "AQID", "expires_at": 1700000000, "transcript": "hi"}
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let audio = response.choices[0].message.audio.as_ref().unwrap();
        assert_eq!(audio.data, "AQID");
        assert_eq!(audio.expires_at, Some(1_700_000_000));
        assert!(audio.format.is_none());
    }

    #[test]
    fn chunk_without_delta_deserializes() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"id":"c","choices":[{"index":0,"finish_reason":"stop"}]}"#)
                .unwrap();
        assert!(chunk.choices[0].delta.is_none());

        let empty: ChatCompletionChunk = serde_json::from_str(r#"{"id":"c"}"#).unwrap();
        assert!(empty.choices.is_empty());
    }

    #[test]
    fn error_code_accepts_numbers() {
        let parsed: ErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"bad","code":400}}"#).unwrap();
        assert_eq!(parsed.error.code.as_deref(), Some("400"));
        assert!(parsed.error.error_type.is_none());
    }
}
