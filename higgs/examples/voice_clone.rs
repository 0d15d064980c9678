//! Voice cloning example.
//!
//! Speaks a line in the voice of a reference recording and saves the
//! returned WAV file.
//!
//! ```bash
//! export BOSON_API_KEY=...
//! cargo run --example voice_clone
//! ```

#![allow(clippy::print_stdout)]

use higgs::prelude::*;

const REFERENCE_AUDIO: &str = "./ref-audio/hogwarts_wand_seller_v2.wav";
const REFERENCE_TRANSCRIPT: &str = "I would imagine so. A wand with a dragon heartstring core is capable of dazzling magic. And the bond between you and your wand should only grow stronger. Do not be surprised at your new wand's ability to perceive your intentions - particularly in a moment of need.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let boson = Boson::from_env()?;

    let request = VoiceCloneRequest::new(
        REFERENCE_AUDIO,
        REFERENCE_TRANSCRIPT,
        "Welcome to Boson AI's voice generation system.",
    );

    let audio = clone_voice(&boson, &request, "output.wav").await?;
    println!("Saved {} bytes to output.wav", audio.len());

    Ok(())
}
