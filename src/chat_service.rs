//! Chat service abstraction
//!
//! The remote consultation service is a black box reached through two
//! requests. The session only talks to it through [`ChatService`].

mod error;
mod http;
mod types;

pub use error::TransportError;
pub use http::HttpChatService;
pub use types::{ChatRequest, ChatResponse, StartConsultationResponse};

use crate::language::Language;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// The remote consultation service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Start a consultation in the given language
    async fn start_consultation(
        &self,
        language: Language,
    ) -> Result<StartConsultationResponse, TransportError>;

    /// Submit a user turn together with the transcript that includes it
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn start_consultation(
        &self,
        language: Language,
    ) -> Result<StartConsultationResponse, TransportError> {
        (**self).start_consultation(language).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        (**self).chat(request).await
    }
}

/// Logging wrapper for chat services
pub struct LoggingChatService {
    inner: Arc<dyn ChatService>,
}

impl LoggingChatService {
    pub fn new(inner: Arc<dyn ChatService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatService for LoggingChatService {
    async fn start_consultation(
        &self,
        language: Language,
    ) -> Result<StartConsultationResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.start_consultation(language).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = "start-consultation",
                    %language,
                    duration_ms = %duration.as_millis(),
                    messages = response.conversation.as_ref().map_or(0, Vec::len),
                    "Consultation started"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = "start-consultation",
                    %language,
                    duration_ms = %duration.as_millis(),
                    status = ?e.status,
                    error = %e.message,
                    "Consultation start request failed"
                );
            }
        }

        result
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = "chat",
                    duration_ms = %duration.as_millis(),
                    sent_messages = request.conversation.len(),
                    received_messages = response.conversation.as_ref().map_or(0, Vec::len),
                    "Chat request completed"
                );
                if let Some(reply) = &response.reply {
                    tracing::debug!(reply = %reply, "Chat reply");
                }
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = "chat",
                    duration_ms = %duration.as_millis(),
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
