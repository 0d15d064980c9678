//! Conversation messages.
//!
//! A conversation is an ordered list of [`Message`]s. Order carries meaning
//! for the model: a voice reference is a user turn holding the transcript
//! followed immediately by an assistant turn holding the matching audio.

use serde::{Deserialize, Serialize};

use crate::audio::InputAudio;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// User turn.
    User,
    /// Assistant (model) turn.
    Assistant,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Content of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text.
    Text(String),
    /// A list of typed content blocks.
    Parts(Vec<ContentPart>),
}

/// A typed content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text block.
    Text {
        /// The text.
        text: String,
    },
    /// Audio attachment block.
    InputAudio {
        /// The attached audio.
        input_audio: InputAudio,
    },
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the turn.
    pub role: Role,
    /// Turn content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl Message {
    /// Create a text message with the given role.
    #[must_use]
    pub fn text_with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(Content::Text(text.into())),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::System, text)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::User, text)
    }

    /// Create an assistant text message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::Assistant, text)
    }

    /// Create an assistant message carrying an audio attachment.
    #[must_use]
    pub fn assistant_audio(audio: InputAudio) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(Content::Parts(vec![ContentPart::InputAudio {
                input_audio: audio,
            }])),
        }
    }

    /// Concatenated text of the message, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self.content.as_ref()? {
            Content::Text(text) => Some(text.clone()),
            Content::Parts(parts) => {
                let text: Vec<&str> = parts
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } => Some(text.as_str()),
                        ContentPart::InputAudio { .. } => None,
                    })
                    .collect();
                (!text.is_empty()).then(|| text.join("\n"))
            }
        }
    }

    /// Whether the message carries an audio attachment.
    #[must_use]
    pub fn has_audio(&self) -> bool {
        matches!(
            &self.content,
            Some(Content::Parts(parts))
                if parts.iter().any(|p| matches!(p, ContentPart::InputAudio { .. }))
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;

    #[test]
    fn text_constructors_set_role() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
        assert_eq!(Message::user("hello").text().as_deref(), Some("hello"));
    }

    #[test]
    fn assistant_audio_has_no_text() {
        let msg = Message::assistant_audio(InputAudio::new("AAAA", AudioFormat::Wav));
        assert!(msg.has_audio());
        assert!(msg.text().is_none());
    }

    #[test]
    fn parts_text_joins_blocks() {
        let msg = Message {
            role: Role::User,
            content: Some(Content::Parts(vec![
                ContentPart::Text { text: "a".into() },
                ContentPart::InputAudio {
                    input_audio: InputAudio::new("AAAA", AudioFormat::Wav),
                },
                ContentPart::Text { text: "b".into() },
            ])),
        };
        assert_eq!(msg.text().as_deref(), Some("a\nb"));
    }

    #[test]
    fn input_audio_part_serializes_tagged() {
        let part = ContentPart::InputAudio {
            input_audio: InputAudio::new("AQID", AudioFormat::Wav),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "input_audio");
        assert_eq!(json["input_audio"]["data"], "AQID");
        assert_eq!(json["input_audio"]["format"], "wav");
    }
}
