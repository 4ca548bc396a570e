//! Chat service request and response types
//!
//! Every response field is optional on the wire. Each one carries its own
//! merge rule so an absent field never silently falls back to whatever the
//! caller happened to hold.

use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Body of `GET /start-consultation/{language}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConsultationResponse {
    #[serde(default)]
    pub conversation: Option<Vec<Message>>,
}

impl StartConsultationResponse {
    pub fn new(conversation: Vec<Message>) -> Self {
        Self {
            conversation: Some(conversation),
        }
    }

    /// The opening transcript. Absent means the session starts empty; the
    /// previous transcript is never carried over.
    pub fn into_transcript(self) -> Vec<Message> {
        self.conversation.unwrap_or_default()
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The raw text the user submitted
    pub input: String,
    /// Transcript including the new user turn
    pub conversation: Vec<Message>,
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub conversation: Option<Vec<Message>>,
    /// The assistant's reply on its own; informational only
    #[serde(default)]
    pub reply: Option<String>,
}

impl ChatResponse {
    pub fn new(conversation: Vec<Message>) -> Self {
        Self {
            conversation: Some(conversation),
            reply: None,
        }
    }

    #[must_use]
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// The reconciled transcript. The service's transcript is authoritative
    /// when present; otherwise the optimistic one stands.
    pub fn reconcile(self, optimistic: Vec<Message>) -> Vec<Message> {
        self.conversation.unwrap_or(optimistic)
    }
}
