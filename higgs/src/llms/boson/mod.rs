//! Boson AI client implementation.
//!
//! The endpoint speaks the chat-completions protocol with audio extensions:
//! - Non-streaming completions returning one base64 audio payload
//! - Streaming completions returning base64 PCM deltas over SSE

mod chat;
mod client;
mod config;
mod stream;
mod types;

pub use client::Boson;
pub use config::BosonConfig;
