//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use higgs::prelude::*;
//! ```

pub use crate::audio::{AudioFormat, GeneratedAudio, InputAudio, PcmSpec};
pub use crate::chat::{
    AudioOutput, BoxedChatProvider, ChatProvider, ChatRequest, ChatResponse, ChunkStream, Modality,
};
pub use crate::error::{Error, LlmError, LlmErrorKind, Result};
pub use crate::llms::{Boson, BosonConfig};
pub use crate::message::{Content, ContentPart, Message, Role};
pub use crate::sink::{AudioSink, StreamSummary, WavSink, write_audio_stream};
pub use crate::stream::{StopReason, StreamChunk};
pub use crate::synthesis::{
    StreamingSpeechRequest, VoiceCloneRequest, clone_voice, speaker_tagged, stream_speech_to_wav,
};
pub use crate::usage::Usage;
