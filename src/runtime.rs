//! Runtime for driving a conversation session
//!
//! One task owns the [`ConversationState`] and applies every transition.
//! Hosts talk to it through a [`ConversationSession`] handle and read state
//! snapshots from a watch channel; nothing else mutates the state.

mod executor;


pub use executor::ConversationRuntime;

use crate::chat_service::ChatService;
use crate::language::Language;
use crate::state_machine::{ConversationState, Event, TransitionError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

/// Why a host call did not take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Conversation session has shut down")]
    Closed,
    #[error(transparent)]
    Rejected(#[from] TransitionError),
}

/// A host event and the channel its outcome is reported on
#[derive(Debug)]
pub struct Command {
    pub event: Event,
    pub ack: oneshot::Sender<Result<(), TransitionError>>,
}

/// Handle to interact with a running session
///
/// Every call returns once the runtime has applied (or refused) the event,
/// so the state observed afterwards already reflects it. Transport failures
/// never surface here; they only show up in the state.
#[derive(Clone)]
pub struct ConversationSession {
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConversationState>,
}

impl ConversationSession {
    /// Mount a session on the current tokio runtime.
    ///
    /// The session starts empty and idle; call [`initialize`](Self::initialize)
    /// to open the consultation.
    pub fn spawn<C: ChatService + 'static>(service: C, language: Language) -> Self {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (runtime, state_rx) = ConversationRuntime::new(service, language, command_rx);
        tokio::spawn(runtime.run());
        Self {
            command_tx,
            state_rx,
        }
    }

    /// Like [`spawn`](Self::spawn), also returning the channel service
    /// results arrive on so tests can deliver results out of band
    #[cfg(test)]
    pub(crate) fn spawn_with_results<C: ChatService + 'static>(
        service: C,
        language: Language,
    ) -> (Self, mpsc::Sender<Event>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (runtime, state_rx) = ConversationRuntime::new(service, language, command_rx);
        let results = runtime.event_sender();
        tokio::spawn(runtime.run());
        let session = Self {
            command_tx,
            state_rx,
        };
        (session, results)
    }

    /// Start (or restart) the consultation in `language`.
    ///
    /// Always accepted; anything still in flight is superseded.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Closed`].
    pub async fn initialize(&self, language: Language) -> Result<(), SessionError> {
        self.dispatch(Event::Initialize { language }).await
    }

    /// Submit a user turn. Blank text is ignored.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while another request is in flight, or
    /// [`SessionError::Closed`].
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(Event::Submit { text: text.into() }).await
    }

    /// Record the text currently being composed.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Closed`].
    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(Event::InputChanged { text: text.into() }).await
    }

    async fn dispatch(&self, event: Event) -> Result<(), SessionError> {
        let (ack, outcome) = oneshot::channel();
        self.command_tx
            .send(Command { event, ack })
            .await
            .map_err(|_| SessionError::Closed)?;
        outcome.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Current state snapshot
    pub fn state(&self) -> ConversationState {
        self.state_rx.borrow().clone()
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state_rx.clone()
    }

    /// Wait until no request is in flight and return that state.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Closed`].
    pub async fn settled(&self) -> Result<ConversationState, SessionError> {
        let mut state_rx = self.state_rx.clone();
        let state = state_rx
            .wait_for(|state| !state.is_loading())
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(ConversationState::clone(&state))
    }
}
