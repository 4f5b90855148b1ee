// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! HTTP implementation of the chat service
//!
//! Endpoints (relative to the configured base URL):
//! - `GET  /conversation-history/?session_id=<id>`
//! - `POST /chat/`
//! - `POST /request-human/`

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{ApiError, CarelineError, Result};

use super::wire::{self, ChatResponse, HandoffResponse, HistoryResponse};
use super::{ChatReply, ChatRequest, ChatService, HandoffReceipt, HandoffSubmission, HistoryEntry};

/// Longest server error body echoed into an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Chat service reached over HTTP(S) with JSON bodies
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the effective settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.get_base_url(), settings.service.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn conversation_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(self.endpoint("conversation-history"))
            .query(&[("session_id", session_id)])
            .send()
            .await
            .map_err(transport_error)?;

        let body: HistoryResponse = read_json(check_status(response).await?).await?;
        Ok(body.into_entries()?)
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let body: ChatResponse = read_json(check_status(response).await?).await?;
        Ok(body.into_reply()?)
    }

    async fn request_human(&self, submission: &HandoffSubmission) -> Result<HandoffReceipt> {
        let response = self
            .client
            .post(self.endpoint("request-human"))
            .json(submission)
            .send()
            .await
            .map_err(transport_error)?;

        let body: HandoffResponse = read_json(check_status(response).await?).await?;
        Ok(body.into_receipt())
    }
}

/// Map a reqwest failure to the transport error taxonomy. Timeouts are kept
/// distinct for logging but are classified like any other transport failure.
fn transport_error(err: reqwest::Error) -> CarelineError {
    if err.is_timeout() {
        CarelineError::Api(ApiError::Timeout)
    } else if err.is_connect() {
        CarelineError::Api(ApiError::Network(format!(
            "could not connect to chat service: {}",
            err
        )))
    } else {
        CarelineError::Api(ApiError::Network(err.to_string()))
    }
}

/// Turn non-2xx responses into errors, keeping any server-provided reason.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let code = status.as_u16();

    if status.is_client_error() {
        return Err(CarelineError::Api(ApiError::ClientError {
            status: code,
            message: wire::error_message(&body),
        }));
    }

    let message = wire::error_message(&body).unwrap_or_else(|| {
        let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        if snippet.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            snippet
        }
    });
    Err(CarelineError::Api(ApiError::ServerError {
        status: code,
        message,
    }))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body)
        .map_err(|e| CarelineError::Api(ApiError::InvalidResponse(e.to_string())))
}
