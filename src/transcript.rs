//! Transcript messages and the display filter
//!
//! The session keeps the raw transcript exactly as exchanged with the chat
//! service. Everything a host renders goes through [`filter`] first.


use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the conversation, tagged by role on the wire
///
/// `{"role":"assistant","content":"...","content_localized":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// Priming content agreed with the service; never rendered
    System { content: String },
    Assistant {
        content: String,
        /// Secondary rendering of the reply, shown instead of `content`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_localized: Option<String>,
    },
    User { content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            content_localized: None,
        }
    }

    pub fn assistant_localized(content: impl Into<String>, localized: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            content_localized: Some(localized.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::Assistant { .. } => Role::Assistant,
            Message::User { .. } => Role::User,
        }
    }

    /// Raw content as exchanged with the service
    pub fn content(&self) -> &str {
        match self {
            Message::System { content }
            | Message::Assistant { content, .. }
            | Message::User { content } => content,
        }
    }

    /// Text to render: localized content wins for assistant turns
    pub fn display_text(&self) -> &str {
        match self {
            Message::Assistant {
                content_localized: Some(localized),
                ..
            } => localized,
            other => other.content(),
        }
    }
}

/// Derive the displayable sequence from a raw transcript.
///
/// System messages are dropped. A user message is dropped when the previously
/// kept message is a user message with identical content, which hides the echo
/// of an optimistic turn when the service returns it again. The input is never
/// modified.
pub fn filter(transcript: &[Message]) -> Vec<Message> {
    let mut kept: Vec<Message> = Vec::with_capacity(transcript.len());

    for message in transcript {
        match message {
            Message::System { .. } => continue,
            Message::User { content } => {
                if let Some(Message::User { content: previous }) = kept.last() {
                    if previous == content {
                        continue;
                    }
                }
            }
            Message::Assistant { .. } => {}
        }
        kept.push(message.clone());
    }

    kept
}
