//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Operation};
pub use event::Event;
pub use state::{ConversationState, Generation, SessionPhase};
pub use transition::{transition, TransitionError, TransitionResult};
