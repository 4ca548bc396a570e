//! Pure state transition function
//!
//! Session start: `Idle -> Initializing -> Idle`
//! Submission:    `Idle -> Submitting -> Idle`
//! `Initialize` is accepted from any phase and supersedes whatever was in flight.

use super::effect::Operation;
use super::state::{Generation, SessionPhase};
use super::{ConversationState, Effect, Event};
use crate::chat_service::ChatRequest;
use crate::transcript::Message;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Why an event was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is already in flight, wait for it to finish")]
    Busy,
    #[error("Result for request {0} arrived after it was superseded")]
    StaleResult(Generation),
}

/// Pure transition function
///
/// Given the same state and event it always produces the same result and
/// performs no I/O. Network work is described by the returned effects.
pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    // Results for anything but the request in flight are dropped whole
    if let Some(generation) = event.generation() {
        if !state.is_current(generation) {
            return Err(TransitionError::StaleResult(generation));
        }
    }

    match (state.phase, event) {
        // ============================================================
        // Host events
        // ============================================================

        // Any phase + Initialize -> Initializing (fresh generation)
        (phase, Event::Initialize { language }) => {
            let generation = state.generation.next();
            let mut next = state.clone();
            next.generation = generation;
            next.phase = SessionPhase::Initializing {
                generation,
                language,
            };
            if language != state.language {
                // A transcript in another language is no longer meaningful
                next.transcript.clear();
                next.language = language;
            }

            let mut result = TransitionResult::new(next);
            if let Some(superseded) = phase.in_flight() {
                result = result.with_effect(Effect::CancelRequest {
                    generation: superseded,
                });
            }
            Ok(result.with_effect(Effect::start_session(generation, language)))
        }

        (_, Event::InputChanged { text }) => {
            let mut next = state.clone();
            next.pending_input = text;
            Ok(TransitionResult::new(next))
        }

        // Blank input is ignored outright, whatever the phase
        (_, Event::Submit { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        // Idle + Submit -> Submitting with the optimistic user turn appended
        (SessionPhase::Idle, Event::Submit { text }) => {
            let generation = state.generation.next();
            let mut next = state.clone();
            next.transcript.push(Message::user(text.clone()));
            next.pending_input.clone_from(&text);
            next.generation = generation;
            next.phase = SessionPhase::Submitting { generation };

            let request = ChatRequest {
                input: text,
                conversation: next.transcript.clone(),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::send_chat(generation, request)))
        }

        (SessionPhase::Initializing { .. } | SessionPhase::Submitting { .. }, Event::Submit { .. }) => {
            Err(TransitionError::Busy)
        }

        // ============================================================
        // Session start outcomes
        // ============================================================

        // Initializing + SessionStarted -> Idle with the service's transcript
        (SessionPhase::Initializing { .. }, Event::SessionStarted { response, .. }) => {
            let mut next = state.clone();
            next.transcript = response.into_transcript();
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next))
        }

        // Initializing + SessionStartFailed -> Idle with an empty transcript
        (SessionPhase::Initializing { .. }, Event::SessionStartFailed { error, .. }) => {
            let mut next = state.clone();
            next.transcript.clear();
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::log_failure(Operation::Initialize, error)))
        }

        // ============================================================
        // Chat outcomes
        // ============================================================

        // Submitting + ChatReplied -> Idle, reconciled with the service
        (SessionPhase::Submitting { .. }, Event::ChatReplied { response, .. }) => {
            let mut next = state.clone();
            let optimistic = std::mem::take(&mut next.transcript);
            next.transcript = response.reconcile(optimistic);
            next.pending_input.clear();
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next))
        }

        // Submitting + ChatFailed -> Idle, optimistic turn and input kept
        (SessionPhase::Submitting { .. }, Event::ChatFailed { error, .. }) => {
            let mut next = state.clone();
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next).with_effect(Effect::log_failure(Operation::Submit, error)))
        }

        // A current generation answered by the wrong kind of result; generations
        // are unique per request so this is treated like any other stray result
        (_, other) => Err(TransitionError::StaleResult(
            other.generation().unwrap_or_default(),
        )),
    }
}
