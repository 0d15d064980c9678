//! Higgs - A client for chat-completion shaped speech generation
//!
//! This crate talks to a hosted audio generation model through its chat
//! completions endpoint. It covers two flows: cloning a voice from a
//! reference recording in a single call, and streaming raw PCM speech
//! straight into a WAV file.
//!
//! ```rust,ignore
//! use higgs::prelude::*;
//!
//! let boson = Boson::from_env()?;
//! let request = StreamingSpeechRequest::new("Hello from Boson AI!");
//! let summary = stream_speech_to_wav(&boson, &request, "streamed_tts.wav").await?;
//! ```

pub mod audio;
pub mod chat;
pub mod error;
pub mod llms;
pub mod message;
pub mod prelude;
pub mod sink;
pub mod stream;
pub mod synthesis;
pub mod usage;

pub use error::{Error, LlmError, Result};
