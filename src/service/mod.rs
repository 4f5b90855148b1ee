// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Remote chat service abstraction
//!
//! The assistant itself is a black box behind three HTTP endpoints. This
//! module defines the strongly typed contract; [`HttpChatService`] speaks it
//! over the wire and [`mock::MockChatService`] stands in for it in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

pub mod http;
pub mod mock;
mod wire;

pub use http::HttpChatService;

/// `response_type` value asking the client to collect human handoff details
pub const COLLECT_HUMAN_DETAILS: &str = "collect_human_details";

/// One stored message returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    pub language: String,
}

/// How the client should treat an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyKind {
    /// Ordinary answer
    #[default]
    Plain,
    /// The assistant wants the human handoff form opened
    CollectHumanDetails,
}

impl ReplyKind {
    /// Interpret the optional `response_type` field. Only the exact
    /// collect-details signal is significant.
    pub fn from_response_type(response_type: Option<&str>) -> Self {
        match response_type {
            Some(COLLECT_HUMAN_DETAILS) => ReplyKind::CollectHumanDetails,
            _ => ReplyKind::Plain,
        }
    }
}

/// Parsed reply of `POST /chat/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub kind: ReplyKind,
}

impl ChatReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ReplyKind::Plain,
        }
    }

    pub fn collect_details(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ReplyKind::CollectHumanDetails,
        }
    }
}

/// Body of `POST /request-human/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffSubmission {
    pub session_id: String,
    pub name: String,
    pub phone: String,
    pub problem_summary: String,
}

/// Parsed reply of `POST /request-human/`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandoffReceipt {
    pub success: bool,
    pub reference_number: Option<String>,
    pub message: Option<String>,
}

/// The remote assistant service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Stored history for a session, oldest first
    async fn conversation_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>>;

    /// Send one user message and get the assistant's reply
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Submit a human agent handoff request
    async fn request_human(&self, submission: &HandoffSubmission) -> Result<HandoffReceipt>;
}
