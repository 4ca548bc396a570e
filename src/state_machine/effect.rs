//! Effects produced by state transitions

use super::state::Generation;
use crate::chat_service::ChatRequest;
use crate::language::Language;
use std::fmt;

/// Which network operation an effect concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Initialize => "initialize",
            Operation::Submit => "submit",
        })
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Request a new consultation (spawns as background task)
    StartSession {
        generation: Generation,
        language: Language,
    },

    /// Send a user turn to the chat endpoint (spawns as background task)
    SendChat {
        generation: Generation,
        request: ChatRequest,
    },

    /// Abort a request that has been superseded
    CancelRequest { generation: Generation },

    /// Record a transport failure that was absorbed into state
    LogFailure { operation: Operation, error: String },
}

impl Effect {
    pub fn start_session(generation: Generation, language: Language) -> Self {
        Effect::StartSession {
            generation,
            language,
        }
    }

    pub fn send_chat(generation: Generation, request: ChatRequest) -> Self {
        Effect::SendChat {
            generation,
            request,
        }
    }

    pub fn log_failure(operation: Operation, error: impl Into<String>) -> Self {
        Effect::LogFailure {
            operation,
            error: error.into(),
        }
    }
}
