//! Consultation client
//!
//! Session logic for a chat-based medical triage assistant: a pure state
//! machine over the transcript, a runtime that drives it against the remote
//! chat service, and the display filter hosts render through.

pub mod chat_service;
pub mod config;
pub mod console;
pub mod language;
pub mod runtime;
pub mod state_machine;
pub mod transcript;

pub use chat_service::{ChatService, HttpChatService, LoggingChatService, TransportError};
pub use config::ClientConfig;
pub use language::Language;
pub use runtime::{ConversationSession, SessionError};
pub use state_machine::ConversationState;
pub use transcript::{filter, Message, Role};
