//! End-to-end tests for the synthesis flows against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::panic)]

use assert_fs::TempDir;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use higgs::prelude::*;
use higgs::synthesis::STREAMING_SYSTEM_PROMPT;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSCRIPT: &str = "I would imagine so. A wand with a dragon heartstring core is capable of dazzling magic.";

fn client(server: &MockServer) -> Boson {
    Boson::new(BosonConfig::new("test-key").with_base_url(format!("{}/v1", server.uri()))).unwrap()
}

fn sse(events: &[&str]) -> String {
    events.iter().map(|e| format!("data: {e}\n\n")).collect()
}

fn audio_event(data: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"audio": {"id": "a1", "data": data}}, "finish_reason": null}]
    })
    .to_string()
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json().unwrap()
}

mod voice_clone {
    use super::*;

    fn reference(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("hogwarts_wand_seller_v2.wav");
        std::fs::write(&path, b"RIFF\x00\x00\x00\x00WAVE").unwrap();
        path
    }

    #[tokio::test]
    async fn saves_payload_byte_for_byte() {
        let server = MockServer::start().await;
        let payload: Vec<u8> = (0..=255).collect();
        let encoded = BASE64.encode(&payload);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": BosonConfig::DEFAULT_MODEL,
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": null, "audio": {"id": "audio_1", "data": encoded}},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.wav");
        let request = VoiceCloneRequest::new(
            reference(&dir),
            TRANSCRIPT,
            "Welcome to Boson AI's voice generation system.",
        );

        let audio = clone_voice(&client(&server), &request, &output).await.unwrap();

        assert_eq!(audio.data, payload);
        assert_eq!(std::fs::read(&output).unwrap(), payload);
    }

    #[tokio::test]
    async fn sends_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"audio": {"data": "AAAA"}}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let request = VoiceCloneRequest::new(reference(&dir), TRANSCRIPT, "Hi there.");
        clone_voice(&client(&server), &request, dir.path().join("out.wav"))
            .await
            .unwrap();

        let body = request_body(&server).await;
        assert_eq!(body["model"], BosonConfig::DEFAULT_MODEL);
        assert_eq!(body["modalities"], json!(["text", "audio"]));
        assert_eq!(body["max_completion_tokens"], 4096);
        assert_eq!(body["top_k"], 50);
        assert_eq!(body["stream"], false);
        assert_eq!(
            body["stop"],
            json!(["<|eot_id|>", "<|end_of_text|>", "<|audio_eos|>"])
        );

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], TRANSCRIPT);
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["content"][0]["type"], "input_audio");
        assert_eq!(
            messages[2]["content"][0]["input_audio"],
            json!({"data": BASE64.encode(b"RIFF\x00\x00\x00\x00WAVE"), "format": "wav"})
        );
        assert_eq!(messages[3]["content"], "[SPEAKER0] Hi there.");
    }

    #[tokio::test]
    async fn missing_reference_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.wav");
        let request = VoiceCloneRequest::new(dir.path().join("missing.wav"), TRANSCRIPT, "x");

        let err = clone_voice(&client(&server), &request, &output)
            .await
            .unwrap_err();

        match err {
            Error::File { path, .. } => assert!(path.ends_with("missing.wav")),
            other => panic!("expected file error, got {other:?}"),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.wav");
        let request = VoiceCloneRequest::new(reference(&dir), TRANSCRIPT, "x");

        let err = clone_voice(&client(&server), &request, &output)
            .await
            .unwrap_err();

        let llm = err.as_llm().unwrap();
        assert_eq!(llm.kind, LlmErrorKind::Auth);
        assert!(llm.message.contains("Invalid API key"));
        assert!(!output.exists());
    }
}

mod streaming {
    use super::*;

    #[tokio::test]
    async fn writes_three_chunk_scenario() {
        let server = MockServer::start().await;
        let first = audio_event("AAAA");
        let second = r#"{"id":"chatcmpl-1","choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
        let third = audio_event("AQID");
        let done = r#"{"id":"chatcmpl-1","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        mount_stream(&server, sse(&[&first, second, &third, done, "[DONE]"])).await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("streamed_tts.wav");
        let request = StreamingSpeechRequest::new("Hello from Boson AI! Streaming to WAV test.");

        let summary = stream_speech_to_wav(&client(&server), &request, &output)
            .await
            .unwrap();

        assert_eq!(summary.bytes_written, 6);
        assert_eq!(summary.audio_chunks, 2);
        assert_eq!(summary.stop_reason, Some(StopReason::Stop));

        let mut reader = hound::WavReader::open(&output).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 24_000);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 0x0100, 0x0302]);

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[bytes.len() - 6..], &[0x00, 0x00, 0x00, 0x01, 0x02, 0x03]);

        let body = request_body(&server).await;
        assert_eq!(body["stream"], true);
        assert_eq!(body["audio"], json!({"format": "pcm16"}));
        assert_eq!(body["max_completion_tokens"], 300);
        assert_eq!(body["messages"][0]["content"], STREAMING_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn error_event_finalizes_file() {
        let server = MockServer::start().await;
        let first = audio_event("AAAA");
        let second = audio_event("AQID");
        let error = r#"{"error":{"message":"upstream closed","code":502}}"#;
        let late = audio_event("BBBB");
        mount_stream(&server, sse(&[&first, &second, error, &late])).await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("streamed_tts.wav");

        let err = stream_speech_to_wav(&client(&server), &StreamingSpeechRequest::new("x"), &output)
            .await
            .unwrap_err();

        let llm = err.as_llm().unwrap();
        assert_eq!(llm.kind, LlmErrorKind::Provider);
        assert_eq!(llm.code.as_deref(), Some("502"));

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.len(), 3);
    }

    #[tokio::test]
    async fn rejected_stream_leaves_empty_container() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "slow down", "type": "rate_limit_error"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("streamed_tts.wav");

        let err = stream_speech_to_wav(&client(&server), &StreamingSpeechRequest::new("x"), &output)
            .await
            .unwrap_err();

        assert_eq!(err.as_llm().unwrap().kind, LlmErrorKind::RateLimited);
        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.len(), 0);
        assert_eq!(reader.spec().sample_rate, 24_000);
    }

    #[tokio::test]
    async fn chunks_without_audio_are_skipped() {
        let server = MockServer::start().await;
        let audio = audio_event("AQID");
        let events = [
            r#"{"id":"c","choices":[]}"#,
            r#"{"id":"c","choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
            audio.as_str(),
            r#"{"id":"c","choices":[{"index":0,"delta":{"audio":null}}]}"#,
            "[DONE]",
        ];
        mount_stream(&server, sse(&events)).await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("streamed_tts.wav");

        let summary = stream_speech_to_wav(&client(&server), &StreamingSpeechRequest::new("x"), &output)
            .await
            .unwrap();

        assert_eq!(summary.audio_chunks, 1);
        assert_eq!(summary.bytes_written, 3);
        // The dangling half sample is dropped from the container.
        let mut reader = hound::WavReader::open(&output).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0x0201]);
    }

    #[tokio::test]
    async fn raw_stream_yields_chunks_in_order() {
        use futures::StreamExt;

        let server = MockServer::start().await;
        let first = audio_event("AAAA");
        let second = audio_event("AQID");
        mount_stream(&server, sse(&[&first, &second, "[DONE]"])).await;

        let request = StreamingSpeechRequest::new("x").to_chat_request();
        let chunks: Vec<StreamChunk> = client(&server)
            .chat_stream(&request)
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(
            chunks,
            vec![StreamChunk::audio("AAAA", None), StreamChunk::audio("AQID", None)]
        );
    }
}
