//! The two speech synthesis flows.
//!
//! - [`clone_voice`]: one non-streaming call that imitates the voice of a
//!   reference recording and saves the returned audio file verbatim.
//! - [`stream_speech_to_wav`]: one streaming call whose PCM fragments are
//!   appended to a WAV file as they arrive.
//!
//! Both are generic over [`ChatProvider`], so they run against the HTTP
//! client or an in-memory double alike.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::{AudioFormat, GeneratedAudio, InputAudio, PcmSpec};
use crate::chat::{AudioOutput, ChatProvider, ChatRequest, Modality};
use crate::error::Result;
use crate::message::Message;
use crate::sink::{AudioSink, StreamSummary, WavSink, write_audio_stream};

/// Stop sequences sent with voice-cloning requests.
pub const DEFAULT_STOP_SEQUENCES: [&str; 3] = ["<|eot_id|>", "<|end_of_text|>", "<|audio_eos|>"];

/// Scene description used when none is given.
pub const DEFAULT_SCENE: &str = "Audio is recorded from a quiet room.";

/// System prompt of the streaming flow.
pub const STREAMING_SYSTEM_PROMPT: &str = "Convert the following text from the user into speech.";

/// Build the voice-cloning system prompt for a scene.
#[must_use]
pub fn voice_clone_system_prompt(scene: &str) -> String {
    format!(
        "You are an AI assistant designed to convert text into speech.\n\
         If the user's message includes a [SPEAKER*] tag, do not read out the tag and generate speech for the following text, using the specified voice.\n\
         If no speaker tag is present, select a suitable voice on your own.\n\
         \n\
         <|scene_desc_start|>\n\
         {scene}\n\
         <|scene_desc_end|>"
    )
}

/// Prefix `text` with a `[SPEAKERn]` voice selector.
#[must_use]
pub fn speaker_tagged(speaker: u32, text: &str) -> String {
    format!("[SPEAKER{speaker}] {text}")
}

/// Parameters of a voice-cloning call.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceCloneRequest {
    /// Model identifier. Empty means the provider default.
    pub model: String,
    /// Recording whose voice is imitated.
    pub reference_audio: PathBuf,
    /// What is said in the reference recording.
    pub reference_transcript: String,
    /// Text to speak.
    pub text: String,
    /// Speaker index for the `[SPEAKERn]` tag.
    pub speaker: u32,
    /// Acoustic scene description.
    pub scene: String,
    /// Output token budget.
    pub max_completion_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Top-k sampling breadth.
    pub top_k: u32,
    /// Stop sequences, forwarded to the service.
    pub stop: Vec<String>,
}

impl VoiceCloneRequest {
    /// Create a request with the default sampling parameters.
    #[must_use]
    pub fn new(
        reference_audio: impl Into<PathBuf>,
        reference_transcript: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            model: String::new(),
            reference_audio: reference_audio.into(),
            reference_transcript: reference_transcript.into(),
            text: text.into(),
            speaker: 0,
            scene: DEFAULT_SCENE.to_owned(),
            max_completion_tokens: 4096,
            temperature: 1.0,
            top_p: 0.95,
            top_k: 50,
            stop: DEFAULT_STOP_SEQUENCES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the speaker index.
    #[must_use]
    pub const fn with_speaker(mut self, speaker: u32) -> Self {
        self.speaker = speaker;
        self
    }

    /// Set the scene description.
    #[must_use]
    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    /// Set the output token budget.
    #[must_use]
    pub const fn with_max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = tokens;
        self
    }

    /// Set the temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set top_p.
    #[must_use]
    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set top_k.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the stop sequences.
    #[must_use]
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    /// Build the chat request, reading the reference recording.
    ///
    /// The conversation is: system prompt, reference transcript (user),
    /// reference audio (assistant), tagged target text (user).
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`](crate::Error::File) if the reference
    /// recording cannot be read.
    pub fn to_chat_request(&self) -> Result<ChatRequest> {
        let reference = InputAudio::from_file(&self.reference_audio)?;

        Ok(ChatRequest::new(self.model.clone())
            .system(voice_clone_system_prompt(&self.scene))
            .user(self.reference_transcript.clone())
            .message(Message::assistant_audio(reference))
            .user(speaker_tagged(self.speaker, &self.text))
            .modalities([Modality::Text, Modality::Audio])
            .max_completion_tokens(self.max_completion_tokens)
            .temperature(self.temperature)
            .top_p(self.top_p)
            .top_k(self.top_k)
            .stop(self.stop.iter().cloned())
            .stream(false))
    }
}

/// Generate speech in the voice of a reference recording and save it.
///
/// The reference file is read before any request is sent, and the payload
/// is fully decoded before `output` is touched, so a failed call leaves no
/// partial file behind.
///
/// # Errors
///
/// Returns a file error for an unreadable reference or output path, the
/// provider error for a failed call, a response format error if the reply
/// carries no audio, or a decode error for a malformed payload.
pub async fn clone_voice<P>(
    provider: &P,
    request: &VoiceCloneRequest,
    output: impl AsRef<Path>,
) -> Result<GeneratedAudio>
where
    P: ChatProvider + ?Sized,
{
    let output = output.as_ref();
    let chat = request.to_chat_request()?;

    info!(
        provider = provider.provider_name(),
        reference = %request.reference_audio.display(),
        speaker = request.speaker,
        "requesting voice-cloned speech"
    );

    let audio = provider.chat(&chat).await?.into_audio()?;
    audio.save(output)?;
    Ok(audio)
}

/// Parameters of a streaming synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingSpeechRequest {
    /// Model identifier. Empty means the provider default.
    pub model: String,
    /// System instruction.
    pub system_prompt: String,
    /// Text to speak.
    pub text: String,
    /// Output token budget.
    pub max_completion_tokens: u32,
    /// Layout of the PCM the service streams back.
    pub pcm: PcmSpec,
}

impl StreamingSpeechRequest {
    /// Create a request with the default parameters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            system_prompt: STREAMING_SYSTEM_PROMPT.to_owned(),
            text: text.into(),
            max_completion_tokens: 300,
            pcm: PcmSpec::default(),
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the output token budget.
    #[must_use]
    pub const fn with_max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = tokens;
        self
    }

    /// Set the PCM layout.
    #[must_use]
    pub const fn with_pcm(mut self, pcm: PcmSpec) -> Self {
        self.pcm = pcm;
        self
    }

    /// Build the streaming chat request.
    #[must_use]
    pub fn to_chat_request(&self) -> ChatRequest {
        ChatRequest::new(self.model.clone())
            .system(self.system_prompt.clone())
            .user(self.text.clone())
            .modalities([Modality::Text, Modality::Audio])
            .audio(AudioOutput::new(AudioFormat::Pcm16))
            .max_completion_tokens(self.max_completion_tokens)
            .stream(true)
    }
}

/// Stream speech into a WAV file at `output`.
///
/// The file and its header are created before the stream is opened. The
/// container is finalized on every path: normal completion, a failure to
/// open the stream, or a failure part way through.
///
/// # Errors
///
/// Returns a file error if `output` cannot be created, the provider error if
/// the stream cannot be opened or fails, or a decode/write error for a bad
/// fragment.
pub async fn stream_speech_to_wav<P>(
    provider: &P,
    request: &StreamingSpeechRequest,
    output: impl AsRef<Path>,
) -> Result<StreamSummary>
where
    P: ChatProvider + ?Sized,
{
    let mut sink = WavSink::create(output, request.pcm)?;
    let chat = request.to_chat_request();

    debug!(
        provider = provider.provider_name(),
        path = %sink.path().display(),
        sample_rate = request.pcm.sample_rate,
        "opening speech stream"
    );

    let stream = match provider.chat_stream(&chat).await {
        Ok(stream) => stream,
        Err(err) => {
            if let Err(close_err) = sink.finalize() {
                warn!(error = %close_err, "failed to finalize WAV file");
            }
            return Err(err);
        }
    };

    let summary = write_audio_stream(stream, &mut sink).await?;
    info!(
        path = %sink.path().display(),
        bytes = summary.bytes_written,
        duration_secs = summary.duration(&request.pcm).as_secs_f64(),
        "saved streamed speech"
    );
    Ok(summary)
}
