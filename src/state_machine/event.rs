//! Events that can occur in a session

use super::state::Generation;
use crate::chat_service::{ChatResponse, StartConsultationResponse};
use crate::language::Language;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Host events
    Initialize {
        language: Language,
    },
    InputChanged {
        text: String,
    },
    Submit {
        text: String,
    },

    // Chat service events
    SessionStarted {
        generation: Generation,
        response: StartConsultationResponse,
    },
    SessionStartFailed {
        generation: Generation,
        error: String,
    },
    ChatReplied {
        generation: Generation,
        response: ChatResponse,
    },
    ChatFailed {
        generation: Generation,
        error: String,
    },
}

impl Event {
    /// Generation a service event answers; `None` for host events
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Event::Initialize { .. } | Event::InputChanged { .. } | Event::Submit { .. } => None,
            Event::SessionStarted { generation, .. }
            | Event::SessionStartFailed { generation, .. }
            | Event::ChatReplied { generation, .. }
            | Event::ChatFailed { generation, .. } => Some(*generation),
        }
    }
}
