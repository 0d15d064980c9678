//! SSE stream parsing.

use bytes::Bytes;

use crate::error::{LlmError, Result};
use crate::stream::{StopReason, StreamChunk};

use super::client::Boson;
use super::types::{ChatCompletionChunk, ErrorResponse};

/// Splits a byte stream into complete lines.
///
/// Network reads may end anywhere, including inside a UTF-8 sequence, so
/// bytes are buffered until a newline arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and return every line they complete.
    pub fn push(&mut self, bytes: &Bytes) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Return the unterminated remainder, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Parse one SSE line into zero or more chunks.
pub fn parse_sse_line(line: &str) -> Result<Vec<StreamChunk>> {
    let line = line.trim();

    // Skip blank separators, comments and non-data fields
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(Vec::new());
    };
    let data = data.trim();

    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }

    if let Ok(error) = serde_json::from_str::<ErrorResponse>(data) {
        let code = error.error.code.or(error.error.error_type);
        let err = match code {
            Some(code) => LlmError::provider_code(Boson::PROVIDER, code, error.error.message),
            None => LlmError::provider(Boson::PROVIDER, error.error.message),
        };
        return Err(err.into());
    }

    let chunk = serde_json::from_str::<ChatCompletionChunk>(data).map_err(|e| {
        LlmError::response_format("valid stream chunk", format!("parse error: {e}, data: {data}"))
    })?;

    Ok(convert_chunk(chunk))
}

/// Parse complete lines in order, stopping after the first failure.
pub fn parse_sse_lines(lines: impl IntoIterator<Item = String>) -> Vec<Result<StreamChunk>> {
    let mut results = Vec::new();
    for line in lines {
        match parse_sse_line(&line) {
            Ok(chunks) => results.extend(chunks.into_iter().map(Ok)),
            Err(e) => {
                results.push(Err(e));
                break;
            }
        }
    }
    results
}

/// Convert a wire chunk; only the first choice carries the generation.
fn convert_chunk(chunk: ChatCompletionChunk) -> Vec<StreamChunk> {
    let mut results = Vec::new();

    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(delta) = choice.delta {
            if let Some(content) = delta.content
                && !content.is_empty()
            {
                results.push(StreamChunk::text(content));
            }

            if let Some(audio) = delta.audio {
                let data = audio.data.unwrap_or_default();
                if !data.is_empty() || audio.transcript.is_some() {
                    results.push(StreamChunk::audio(data, audio.transcript));
                }
            }
        }

        if let Some(reason) = choice.finish_reason {
            results.push(StreamChunk::done(Some(StopReason::parse(&reason))));
        }
    }

    if let Some(usage) = chunk.usage {
        results.push(StreamChunk::Usage(usage));
    }

    results
}
