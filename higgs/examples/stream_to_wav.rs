//! Streaming speech example.
//!
//! Streams raw 16-bit PCM from the model and appends it to a WAV file as
//! it arrives. Per-chunk progress is logged at trace level.
//!
//! ```bash
//! export BOSON_API_KEY=...
//! RUST_LOG=higgs=trace cargo run --example stream_to_wav
//! ```

#![allow(clippy::print_stdout)]

use higgs::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let boson = Boson::from_env()?;

    let request = StreamingSpeechRequest::new("Hello from Boson AI! Streaming to WAV test.");
    let summary = stream_speech_to_wav(&boson, &request, "streamed_tts.wav").await?;

    println!(
        "Saved streamed audio to streamed_tts.wav ({:.2}s, {} chunks)",
        summary.duration(&request.pcm).as_secs_f64(),
        summary.audio_chunks
    );

    Ok(())
}
