//! Conversation runtime executor

use super::Command;
use crate::chat_service::ChatService;
use crate::language::Language;
use crate::state_machine::{
    transition, ConversationState, Effect, Event, Generation, Operation, TransitionError,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Owns the session state and executes the effects of each transition
pub struct ConversationRuntime<C>
where
    C: ChatService + 'static,
{
    /// Correlates log lines from one mounted session
    session_id: String,
    state: ConversationState,
    service: Arc<C>,
    command_rx: mpsc::Receiver<Command>,
    /// Results of spawned requests come back on this channel
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    state_tx: watch::Sender<ConversationState>,
    /// Cancellation tokens for requests that have not reported back yet
    in_flight: HashMap<Generation, CancellationToken>,
}

impl<C> ConversationRuntime<C>
where
    C: ChatService + 'static,
{
    pub fn new(
        service: C,
        language: Language,
        command_rx: mpsc::Receiver<Command>,
    ) -> (Self, watch::Receiver<ConversationState>) {
        let state = ConversationState::new(language);
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (event_tx, event_rx) = mpsc::channel(32);

        let runtime = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            state,
            service: Arc::new(service),
            command_rx,
            event_rx,
            event_tx,
            state_tx,
            in_flight: HashMap::new(),
        };
        (runtime, state_rx)
    }

    /// Sender for service results, as the spawned requests use
    #[cfg(test)]
    pub(crate) fn event_sender(&self) -> mpsc::Sender<Event> {
        self.event_tx.clone()
    }

    /// Process events until every session handle is dropped
    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            language = %self.state.language,
            "Starting conversation session"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { event, ack }) = command else {
                        break;
                    };
                    let outcome = self.process_event(event);
                    // The caller may have stopped waiting
                    let _ = ack.send(outcome);
                }
                Some(event) = self.event_rx.recv() => {
                    // Refusals are already logged
                    let _ = self.process_event(event);
                }
            }
        }

        // The session is unmounting; nobody is left to see late results
        for (_, token) in self.in_flight.drain() {
            token.cancel();
        }

        tracing::info!(session_id = %self.session_id, "Conversation session stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        if let Some(generation) = event.generation() {
            // The request behind a result is finished whether or not it applies
            self.in_flight.remove(&generation);
        }

        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                match e {
                    TransitionError::StaleResult(generation) => {
                        tracing::debug!(
                            session_id = %self.session_id,
                            %generation,
                            "Discarding result of superseded request"
                        );
                    }
                    TransitionError::Busy => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            phase = ?self.state.phase,
                            "Rejected submission while a request is in flight"
                        );
                    }
                }
                return Err(e);
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        self.publish();

        Ok(())
    }

    /// Push the state to observers, waking them only on an actual change
    fn publish(&self) {
        let state = &self.state;
        self.state_tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                current.clone_from(state);
                true
            }
        });
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartSession {
                generation,
                language,
            } => {
                tracing::debug!(session_id = %self.session_id, %generation, %language, "Starting consultation");
                let service = Arc::clone(&self.service);
                self.spawn_request(generation, async move {
                    match service.start_consultation(language).await {
                        Ok(response) => Event::SessionStarted {
                            generation,
                            response,
                        },
                        Err(e) => Event::SessionStartFailed {
                            generation,
                            error: e.to_string(),
                        },
                    }
                });
            }

            Effect::SendChat {
                generation,
                request,
            } => {
                tracing::debug!(
                    session_id = %self.session_id,
                    %generation,
                    messages = request.conversation.len(),
                    "Sending chat turn"
                );
                let service = Arc::clone(&self.service);
                self.spawn_request(generation, async move {
                    match service.chat(&request).await {
                        Ok(response) => Event::ChatReplied {
                            generation,
                            response,
                        },
                        Err(e) => Event::ChatFailed {
                            generation,
                            error: e.to_string(),
                        },
                    }
                });
            }

            Effect::CancelRequest { generation } => {
                if let Some(token) = self.in_flight.remove(&generation) {
                    tracing::debug!(session_id = %self.session_id, %generation, "Cancelling superseded request");
                    token.cancel();
                }
            }

            Effect::LogFailure { operation, error } => match operation {
                Operation::Initialize => {
                    tracing::error!(
                        session_id = %self.session_id,
                        %operation,
                        language = %self.state.language,
                        error = %error,
                        "Failed to initialize conversation, transcript cleared"
                    );
                }
                Operation::Submit => {
                    tracing::error!(
                        session_id = %self.session_id,
                        %operation,
                        error = %error,
                        "Chat request failed, keeping the user's message"
                    );
                }
            },
        }
    }

    /// Run a request in the background, reporting its result as an event
    /// unless it is cancelled first
    fn spawn_request<F>(&mut self, generation: Generation, request: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        self.in_flight.insert(generation, cancel.clone());
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                event = request => {
                    let _ = event_tx.send(event).await;
                }
            }
        });
    }
}
