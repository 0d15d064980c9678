//! Streaming audio-to-file consumer.
//!
//! [`write_audio_stream`] drains a [`StreamChunk`] stream into an
//! [`AudioSink`], appending decoded PCM in arrival order. The sink is
//! finalized exactly once whether the stream is exhausted or fails part way,
//! so a WAV file is always left with valid header lengths.
//!
//! ```rust,ignore
//! let mut sink = WavSink::create("streamed_tts.wav", PcmSpec::default())?;
//! let stream = provider.chat_stream(&request).await?;
//! let summary = write_audio_stream(stream, &mut sink).await?;
//! ```

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{Stream, StreamExt};
use tracing::{debug, info, trace, warn};

use crate::audio::PcmSpec;
use crate::error::{Error, Result};
use crate::stream::{StopReason, StreamChunk};
use crate::usage::Usage;

/// Destination for raw PCM frames.
pub trait AudioSink {
    /// Append raw PCM bytes in the sink's fixed layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written.
    fn write_frames(&mut self, pcm: &[u8]) -> Result<()>;

    /// Flush and close the sink. Calls after the first are no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be finalized.
    fn finalize(&mut self) -> Result<()>;
}

type WavFileWriter = hound::WavWriter<BufWriter<File>>;

/// A WAV file receiving little-endian 16-bit PCM.
///
/// The header is written on [`create`](Self::create) and its length fields
/// are patched on [`finalize`](AudioSink::finalize). Dropping an unfinalized
/// sink finalizes it, ignoring errors.
pub struct WavSink {
    path: PathBuf,
    spec: PcmSpec,
    writer: Option<WavFileWriter>,
    // Low byte of a sample split across two fragments.
    pending: Option<u8>,
    bytes_written: u64,
}

impl fmt::Debug for WavSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavSink")
            .field("path", &self.path)
            .field("spec", &self.spec)
            .field("finalized", &self.is_finalized())
            .field("bytes_written", &self.bytes_written)
            .finish_non_exhaustive()
    }
}

impl WavSink {
    /// Create the file and write a header for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for unsupported layouts and
    /// [`Error::File`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, spec: PcmSpec) -> Result<Self> {
        let path = path.as_ref();
        let wav_spec = spec.to_wav_spec()?;
        let writer = hound::WavWriter::create(path, wav_spec).map_err(|e| match e {
            hound::Error::IoError(io) => Error::file(path, io),
            other => Error::Wav(other),
        })?;
        debug!(
            path = %path.display(),
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            "opened WAV sink"
        );
        Ok(Self {
            path: path.to_path_buf(),
            spec,
            writer: Some(writer),
            pending: None,
            bytes_written: 0,
        })
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fixed sample layout.
    #[must_use]
    pub const fn spec(&self) -> PcmSpec {
        self.spec
    }

    /// PCM bytes committed to the file so far.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Whether the sink has been finalized.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.writer.is_none()
    }
}

impl AudioSink for WavSink {
    fn write_frames(&mut self, pcm: &[u8]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(std::io::Error::other("write after finalize").into());
        };

        let mut rest = pcm;
        if let Some(low) = self.pending.take() {
            let Some((&high, tail)) = rest.split_first() else {
                self.pending = Some(low);
                return Ok(());
            };
            writer.write_sample(i16::from_le_bytes([low, high]))?;
            self.bytes_written += 2;
            rest = tail;
        }

        let mut samples = rest.chunks_exact(2);
        for pair in &mut samples {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        self.bytes_written += (rest.len() - samples.remainder().len()) as u64;
        self.pending = samples.remainder().first().copied();
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        if let Some(byte) = self.pending.take() {
            warn!(
                path = %self.path.display(),
                byte,
                "discarding trailing half sample at end of stream"
            );
        }
        writer.finalize()?;
        info!(
            path = %self.path.display(),
            bytes = self.bytes_written,
            duration_secs = self.spec.duration_of(self.bytes_written).as_secs_f64(),
            "finalized WAV file"
        );
        Ok(())
    }
}

/// Outcome of draining a chunk stream into a sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Chunks received.
    pub chunks: usize,
    /// Chunks that carried audio.
    pub audio_chunks: usize,
    /// Decoded PCM bytes handed to the sink.
    pub bytes_written: u64,
    /// Concatenated text and audio transcript deltas.
    pub transcript: String,
    /// Final stop reason, if the service sent one.
    pub stop_reason: Option<StopReason>,
    /// Token usage, if the service sent it.
    pub usage: Option<Usage>,
}

impl StreamSummary {
    /// Playback duration of the written audio under `spec`.
    #[must_use]
    pub fn duration(&self, spec: &PcmSpec) -> Duration {
        spec.duration_of(self.bytes_written)
    }

    fn apply<K: AudioSink + ?Sized>(&mut self, chunk: StreamChunk, sink: &mut K) -> Result<()> {
        self.chunks += 1;
        match chunk {
            StreamChunk::Audio { data, transcript } => {
                if let Some(t) = transcript {
                    self.transcript.push_str(&t);
                }
                let pcm = BASE64.decode(data.as_bytes())?;
                if pcm.is_empty() {
                    return Ok(());
                }
                trace!(chunk = self.chunks, bytes = pcm.len(), "audio delta");
                sink.write_frames(&pcm)?;
                self.audio_chunks += 1;
                self.bytes_written += pcm.len() as u64;
            }
            StreamChunk::Text { text } => self.transcript.push_str(&text),
            StreamChunk::Usage(usage) => self.usage = Some(usage),
            StreamChunk::Done { stop_reason } => {
                if stop_reason.is_some() {
                    self.stop_reason = stop_reason;
                }
            }
        }
        Ok(())
    }
}

/// Drain `stream` into `sink`, then finalize the sink exactly once.
///
/// Audio deltas are decoded and written in arrival order; every other chunk
/// contributes zero bytes. A failure item, a malformed fragment or a write
/// error stops consumption; the sink is still finalized before the original
/// error is returned.
///
/// # Errors
///
/// Returns the first stream, decode or write error, or the finalize error if
/// consumption itself succeeded.
pub async fn write_audio_stream<S, K>(stream: S, sink: &mut K) -> Result<StreamSummary>
where
    S: Stream<Item = Result<StreamChunk>>,
    K: AudioSink + ?Sized,
{
    let mut summary = StreamSummary::default();
    let consumed = drain(stream, sink, &mut summary).await;
    let closed = sink.finalize();

    match (consumed, closed) {
        (Ok(()), Ok(())) => {
            debug!(
                chunks = summary.chunks,
                audio_chunks = summary.audio_chunks,
                bytes = summary.bytes_written,
                "audio stream complete"
            );
            Ok(summary)
        }
        (Err(err), Ok(())) => {
            warn!(
                chunks = summary.chunks,
                bytes = summary.bytes_written,
                error = %err,
                "audio stream aborted"
            );
            Err(err)
        }
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to finalize sink after stream error");
            Err(err)
        }
        (Ok(()), Err(close_err)) => Err(close_err),
    }
}

async fn drain<S, K>(stream: S, sink: &mut K, summary: &mut StreamSummary) -> Result<()>
where
    S: Stream<Item = Result<StreamChunk>>,
    K: AudioSink + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(chunk) = stream.next().await {
        summary.apply(chunk?, sink)?;
    }
    Ok(())
}
