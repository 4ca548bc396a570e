//! HTTP implementation of the chat service

use super::{ChatRequest, ChatResponse, ChatService, StartConsultationResponse, TransportError};
use crate::config::ClientConfig;
use crate::language::Language;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Chat service reached over HTTP with JSON bodies
pub struct HttpChatService {
    client: Client,
    base_url: Url,
}

impl HttpChatService {
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute http(s) URL or the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::invalid_url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::invalid_url(base_url.as_str()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// # Errors
    ///
    /// See [`HttpChatService::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url, config.request_timeout)
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::invalid_url(self.base_url.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(TransportError::status(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| TransportError::decode(e.to_string()))
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn start_consultation(
        &self,
        language: Language,
    ) -> Result<StartConsultationResponse, TransportError> {
        let url = self.endpoint(&["start-consultation", language.as_str()])?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let url = self.endpoint(&["chat"])?;
        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }
}
