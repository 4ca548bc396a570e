//! Conversation state types

use crate::language::Language;
use crate::transcript::{self, Message};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token attached to every network request the session issues.
///
/// Generations only ever increase, so a result carrying anything other than
/// the generation of the operation currently in flight is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the session is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// No request in flight
    #[default]
    Idle,

    /// Session-start request in flight
    Initializing {
        generation: Generation,
        language: Language,
    },

    /// Chat request in flight; the transcript already holds the optimistic turn
    Submitting { generation: Generation },
}

impl SessionPhase {
    /// Generation of the request in flight, if any
    pub fn in_flight(self) -> Option<Generation> {
        match self {
            SessionPhase::Idle => None,
            SessionPhase::Initializing { generation, .. }
            | SessionPhase::Submitting { generation } => Some(generation),
        }
    }
}

/// Everything the host renders from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Raw transcript exactly as exchanged with the service
    pub transcript: Vec<Message>,
    /// Text being composed, cleared once a submission succeeds
    pub pending_input: String,
    pub phase: SessionPhase,
    pub language: Language,
    /// Last generation handed out
    pub generation: Generation,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl ConversationState {
    /// Empty state as created at mount
    pub fn new(language: Language) -> Self {
        Self {
            transcript: Vec::new(),
            pending_input: String::new(),
            phase: SessionPhase::Idle,
            language,
            generation: Generation::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        !matches!(self.phase, SessionPhase::Idle)
    }

    /// Whether a result tagged with `generation` belongs to the request in flight
    pub fn is_current(&self, generation: Generation) -> bool {
        self.phase.in_flight() == Some(generation)
    }

    /// The transcript as it should be rendered
    pub fn displayed(&self) -> Vec<Message> {
        transcript::filter(&self.transcript)
    }
}
