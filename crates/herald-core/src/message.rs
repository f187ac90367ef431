//! Outgoing reply model and the send collaborator.
//!
//! A command handler's return value reduces to one of three reply kinds:
//! plain text, rich content, or a structured payload. The [`Replier`]
//! trait is the seam to whatever transport actually delivers them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::TargetId;

/// A single unit of rich content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text.
    Text { text: String },
    /// A mention of a user or channel.
    Mention { id: TargetId },
    /// An image by URL.
    Image { url: String },
}

/// Rich content composed of segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub segments: Vec<Segment>,
}

impl RichText {
    /// A rich text holding a single text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Text { text: text.into() }],
        }
    }

    /// Concatenated text content of all text segments.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A fully structured outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendPayload {
    /// Text content; subject to the sanitizer hook.
    pub content: String,
    /// Optional rich content alongside the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich: Option<RichText>,
    /// Suppress notifications for this message.
    #[serde(default)]
    pub silent: bool,
}

impl SendPayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// What a command handler's return value turned into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// Plain text.
    Text(String),
    /// Rich content.
    Rich(RichText),
    /// A structured payload.
    Payload(SendPayload),
}

impl Reply {
    /// An empty reply is never delivered.
    pub fn is_empty(&self) -> bool {
        match self {
            Reply::Text(text) => text.is_empty(),
            Reply::Rich(rich) => rich.is_empty(),
            Reply::Payload(payload) => payload.content.is_empty() && payload.rich.is_none(),
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_owned())
    }
}

impl From<RichText> for Reply {
    fn from(rich: RichText) -> Self {
        Reply::Rich(rich)
    }
}

impl From<SendPayload> for Reply {
    fn from(payload: SendPayload) -> Self {
        Reply::Payload(payload)
    }
}

/// Errors from the send collaborator.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The transport is not connected.
    #[error("transport not connected")]
    NotConnected,
    /// The event had no reply target to deliver to.
    #[error("no reply target for event '{event}'")]
    NoTarget {
        /// Name of the offending event type.
        event: &'static str,
    },
    /// The transport rejected the message.
    #[error("failed to send reply: {0}")]
    Rejected(String),
}

/// The external collaborator that delivers replies.
#[async_trait]
pub trait Replier: Send + Sync {
    /// Delivers `reply` to the conversation identified by `target`.
    async fn send(&self, target: TargetId, reply: Reply) -> Result<(), SendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_emptiness() {
        assert!(Reply::Text(String::new()).is_empty());
        assert!(!Reply::from("hi").is_empty());
        assert!(Reply::Rich(RichText::default()).is_empty());
        assert!(!Reply::Payload(SendPayload::text("x")).is_empty());
    }

    #[test]
    fn rich_text_plain_extraction() {
        let rich = RichText {
            segments: vec![
                Segment::Text { text: "a".into() },
                Segment::Mention { id: TargetId(1) },
                Segment::Text { text: "b".into() },
            ],
        };
        assert_eq!(rich.plain_text(), "ab");
    }

    #[test]
    fn payload_serializes_roundtrip() {
        let payload = SendPayload {
            content: "hello".into(),
            rich: Some(RichText::text("hello")),
            silent: true,
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: SendPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
