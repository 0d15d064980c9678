//! Audio formats, attachments and decoded payloads.
//!
//! Binary audio crosses the API boundary as standard base64 text:
//! - [`InputAudio`]: an attachment sent to the model (e.g. a voice reference)
//! - [`GeneratedAudio`]: a complete payload returned by a non-streaming call
//! - [`PcmSpec`]: the fixed layout of raw PCM frames produced by streaming

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Audio format tag used in requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// WAV container
    #[default]
    Wav,
    /// MP3
    Mp3,
    /// FLAC
    Flac,
    /// Opus
    Opus,
    /// AAC
    Aac,
    /// Raw little-endian 16-bit PCM (streaming)
    Pcm16,
    /// Raw PCM
    Pcm,
}

impl AudioFormat {
    /// Get the format string for API requests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Pcm16 => "pcm16",
            Self::Pcm => "pcm",
        }
    }

    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Pcm16 | Self::Pcm => "pcm",
            other => other.as_str(),
        }
    }

    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Flac => "audio/flac",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Pcm16 | Self::Pcm => "audio/pcm",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            "opus" => Some(Self::Opus),
            "aac" => Some(Self::Aac),
            "pcm" | "raw" => Some(Self::Pcm),
            _ => None,
        }
    }

    /// Parse a wire format tag.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "pcm16" => Some(Self::Pcm16),
            other => Self::from_extension(other),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audio attachment carried inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAudio {
    /// Base64-encoded audio bytes.
    pub data: String,
    /// Declared encoding of the bytes.
    pub format: AudioFormat,
}

impl InputAudio {
    /// Create an attachment from already-encoded data.
    #[must_use]
    pub fn new(data: impl Into<String>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    /// Encode raw bytes into an attachment.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], format: AudioFormat) -> Self {
        Self::new(BASE64.encode(bytes), format)
    }

    /// Read a local audio file into an attachment.
    ///
    /// The format is inferred from the file extension, defaulting to WAV.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::file(path, e))?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension)
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), bytes = bytes.len(), %format, "loaded audio attachment");
        Ok(Self::from_bytes(&bytes, format))
    }

    /// Decode the attachment back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(&self.data)?)
    }
}

/// Sample layout of raw PCM audio written to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Bytes per sample.
    pub sample_width: u16,
    /// Frames per second.
    pub sample_rate: u32,
}

impl PcmSpec {
    /// Sample rate of streamed speech.
    pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

    /// Mono, 16-bit PCM at the given rate.
    #[must_use]
    pub const fn mono_16bit(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_width: 2,
            sample_rate,
        }
    }

    /// Size of one frame (one sample per channel) in bytes.
    #[must_use]
    pub fn bytes_per_frame(&self) -> u64 {
        u64::from(self.channels) * u64::from(self.sample_width)
    }

    /// Playback duration of `bytes` raw PCM bytes.
    #[must_use]
    pub fn duration_of(&self, bytes: u64) -> Duration {
        let frame = self.bytes_per_frame();
        if frame == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = bytes / frame;
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    /// Convert into a WAV header description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for layouts other than 16-bit integer PCM.
    pub fn to_wav_spec(&self) -> Result<hound::WavSpec> {
        if self.sample_width != 2 {
            return Err(Error::invalid_config(format!(
                "unsupported sample width: {} bytes (only 16-bit PCM is streamed)",
                self.sample_width
            )));
        }
        if self.channels == 0 || self.sample_rate == 0 {
            return Err(Error::invalid_config(format!(
                "channels and sample rate must be non-zero, got {} channels at {} Hz",
                self.channels, self.sample_rate
            )));
        }
        Ok(hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.sample_width * 8,
            sample_format: hound::SampleFormat::Int,
        })
    }
}

impl Default for PcmSpec {
    fn default() -> Self {
        Self::mono_16bit(Self::DEFAULT_SAMPLE_RATE)
    }
}

/// A complete audio payload returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAudio {
    /// Identifier assigned by the service.
    pub id: Option<String>,
    /// Decoded audio bytes.
    pub data: Vec<u8>,
    /// Container format of `data`.
    pub format: AudioFormat,
    /// Transcript of the spoken audio.
    pub transcript: Option<String>,
    /// Unix timestamp after which the audio id is no longer valid.
    pub expires_at: Option<u64>,
}

impl GeneratedAudio {
    /// Wrap decoded bytes.
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            id: None,
            data,
            format,
            transcript: None,
            expires_at: None,
        }
    }

    /// Decode a base64 payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not valid base64.
    pub fn from_base64(data: &str, format: AudioFormat) -> Result<Self> {
        Ok(Self::new(BASE64.decode(data)?, format))
    }

    /// Set the transcript.
    #[must_use]
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    /// Number of audio bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the bytes verbatim to `path` in one operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.data).map_err(|e| Error::file(path, e))?;
        tracing::info!(path = %path.display(), bytes = self.data.len(), format = %self.format, "saved audio");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    mod audio_format {
        use super::*;

        #[test]
        fn wire_tags() {
            assert_eq!(AudioFormat::Wav.as_str(), "wav");
            assert_eq!(AudioFormat::Pcm16.as_str(), "pcm16");
            assert_eq!(AudioFormat::Pcm16.extension(), "pcm");
        }

        #[test]
        fn serializes_lowercase() {
            assert_eq!(serde_json::to_value(AudioFormat::Pcm16).unwrap(), "pcm16");
            let parsed: AudioFormat = serde_json::from_str("\"mp3\"").unwrap();
            assert_eq!(parsed, AudioFormat::Mp3);
        }

        #[test]
        fn from_extension_case_insensitive() {
            assert_eq!(AudioFormat::from_extension("WAV"), Some(AudioFormat::Wav));
            assert_eq!(AudioFormat::from_extension("ogg"), None);
            assert_eq!(AudioFormat::parse("pcm16"), Some(AudioFormat::Pcm16));
        }
    }

    mod input_audio {
        use super::*;

        #[test]
        fn from_bytes_encodes_standard_base64() {
            let audio = InputAudio::from_bytes(&[1, 2, 3], AudioFormat::Wav);
            assert_eq!(audio.data, "AQID");
            assert_eq!(audio.decode().unwrap(), vec![1, 2, 3]);
        }

        #[test]
        fn from_file_reads_and_infers_format() {
            let dir = TempDir::new().unwrap();
            let file = dir.child("reference.mp3");
            file.write_binary(&[0, 0, 0]).unwrap();

            let audio = InputAudio::from_file(file.path()).unwrap();
            assert_eq!(audio.format, AudioFormat::Mp3);
            assert_eq!(audio.data, "AAAA");
        }

        #[test]
        fn from_file_without_extension_defaults_to_wav() {
            let dir = TempDir::new().unwrap();
            let file = dir.child("reference");
            file.write_binary(b"RIFF").unwrap();

            let audio = InputAudio::from_file(file.path()).unwrap();
            assert_eq!(audio.format, AudioFormat::Wav);
        }

        #[test]
        fn from_file_missing_is_file_error() {
            let dir = TempDir::new().unwrap();
            let missing = dir.path().join("missing.wav");
            let err = InputAudio::from_file(&missing).unwrap_err();
            match err {
                Error::File { path, source } => {
                    assert_eq!(path, missing);
                    assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
                }
                other => panic!("expected file error, got {other:?}"),
            }
        }
    }

    mod pcm_spec {
        use super::*;

        #[test]
        fn default_is_mono_16bit_24khz() {
            let spec = PcmSpec::default();
            assert_eq!(spec.channels, 1);
            assert_eq!(spec.sample_width, 2);
            assert_eq!(spec.sample_rate, 24_000);
            assert_eq!(spec.bytes_per_frame(), 2);
        }

        #[test]
        fn duration_counts_whole_frames() {
            let spec = PcmSpec::default();
            assert_eq!(spec.duration_of(48_000), Duration::from_secs(1));
            assert_eq!(spec.duration_of(1), Duration::ZERO);
        }

        #[test]
        fn wav_spec_matches_layout() {
            let wav = PcmSpec::default().to_wav_spec().unwrap();
            assert_eq!(wav.channels, 1);
            assert_eq!(wav.bits_per_sample, 16);
            assert_eq!(wav.sample_rate, 24_000);
            assert_eq!(wav.sample_format, hound::SampleFormat::Int);
        }

        #[test]
        fn wav_spec_rejects_other_widths() {
            let spec = PcmSpec {
                sample_width: 3,
                ..PcmSpec::default()
            };
            assert!(matches!(spec.to_wav_spec(), Err(Error::InvalidConfig(_))));
        }
    }

    mod generated_audio {
        use super::*;

        #[test]
        fn from_base64_decodes() {
            let audio = GeneratedAudio::from_base64("AQID", AudioFormat::Wav).unwrap();
            assert_eq!(audio.data, vec![1, 2, 3]);
            assert_eq!(audio.len(), 3);
        }

        #[test]
        fn from_base64_rejects_garbage() {
            let err = GeneratedAudio::from_base64("%%%", AudioFormat::Wav).unwrap_err();
            assert!(matches!(err, Error::Decode(_)));
        }

        #[test]
        fn save_writes_bytes_verbatim() {
            let dir = TempDir::new().unwrap();
            let out = dir.child("output.wav");
            let audio = GeneratedAudio::new(vec![9, 8, 7, 6], AudioFormat::Wav);

            audio.save(out.path()).unwrap();
            assert_eq!(std::fs::read(out.path()).unwrap(), vec![9, 8, 7, 6]);
        }

        #[test]
        fn save_to_missing_directory_fails() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("nope").join("output.wav");
            let audio = GeneratedAudio::new(vec![1], AudioFormat::Wav);
            assert!(matches!(audio.save(&out), Err(Error::File { .. })));
        }
    }
}
