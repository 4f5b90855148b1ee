// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock chat service for testing
//!
//! Provides a configurable in-process implementation of [`ChatService`]
//! that records every request and replays queued responses, so the session,
//! conversation and handoff logic can be tested without a server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{ApiError, CarelineError, Result};

use super::{ChatReply, ChatRequest, ChatService, HandoffReceipt, HandoffSubmission, HistoryEntry};

/// A failure the mock should report instead of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Connection refused or similar
    Transport,
    /// Request timed out
    Timeout,
    /// Non-2xx status; `message` is the `error` field of the body, if any
    Status { status: u16, message: Option<String> },
    /// 2xx with an unusable body
    Malformed,
}

impl MockFailure {
    fn to_error(&self) -> CarelineError {
        let api = match self {
            MockFailure::Transport => ApiError::Network("connection refused".to_string()),
            MockFailure::Timeout => ApiError::Timeout,
            MockFailure::Status { status, message } if (400..500).contains(status) => {
                ApiError::ClientError {
                    status: *status,
                    message: message.clone(),
                }
            }
            MockFailure::Status { status, message } => ApiError::ServerError {
                status: *status,
                message: message.clone().unwrap_or_default(),
            },
            MockFailure::Malformed => ApiError::InvalidResponse("malformed body".to_string()),
        };
        CarelineError::Api(api)
    }
}

type Queued<T> = std::result::Result<T, MockFailure>;

#[derive(Default)]
struct MockState {
    history: Option<Queued<Vec<HistoryEntry>>>,
    chat_replies: VecDeque<Queued<ChatReply>>,
    handoff_replies: VecDeque<Queued<HandoffReceipt>>,
    history_requests: Vec<String>,
    chat_requests: Vec<ChatRequest>,
    handoff_requests: Vec<HandoffSubmission>,
}

/// A mock chat service. Clones share queues and recorded requests.
#[derive(Clone, Default)]
pub struct MockChatService {
    state: Arc<Mutex<MockState>>,
    chat_delay: Option<Duration>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this history (oldest first) for every history request
    pub fn with_history(self, entries: Vec<HistoryEntry>) -> Self {
        self.lock().history = Some(Ok(entries));
        self
    }

    /// Fail every history request
    pub fn with_history_failure(self, failure: MockFailure) -> Self {
        self.lock().history = Some(Err(failure));
        self
    }

    /// Delay each chat reply, to keep a send outstanding
    pub fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = Some(delay);
        self
    }

    /// Queue a chat reply
    pub fn with_reply(self, reply: ChatReply) -> Self {
        self.lock().chat_replies.push_back(Ok(reply));
        self
    }

    /// Queue a chat failure
    pub fn with_chat_failure(self, failure: MockFailure) -> Self {
        self.lock().chat_replies.push_back(Err(failure));
        self
    }

    /// Queue a handoff receipt
    pub fn with_handoff_receipt(self, receipt: HandoffReceipt) -> Self {
        self.lock().handoff_replies.push_back(Ok(receipt));
        self
    }

    /// Queue a handoff failure
    pub fn with_handoff_failure(self, failure: MockFailure) -> Self {
        self.lock().handoff_replies.push_back(Err(failure));
        self
    }

    /// Session ids passed to the history endpoint
    pub fn history_requests(&self) -> Vec<String> {
        self.lock().history_requests.clone()
    }

    /// Recorded chat requests
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// Recorded handoff submissions
    pub fn handoff_requests(&self) -> Vec<HandoffSubmission> {
        self.lock().handoff_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Mock chat service lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

/// Build a history entry for fixtures
pub fn history_entry(id: &str, content: &str, is_user: bool, at: DateTime<Utc>) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        content: content.to_string(),
        is_user,
        timestamp: at,
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn conversation_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let mut state = self.lock();
        state.history_requests.push(session_id.to_string());
        match &state.history {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            // An unknown session on the real backend answers 404.
            None => Err(MockFailure::Status {
                status: 404,
                message: Some("Conversation not found".to_string()),
            }
            .to_error()),
        }
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        let next = {
            let mut state = self.lock();
            state.chat_requests.push(request.clone());
            state.chat_replies.pop_front()
        };

        if let Some(delay) = self.chat_delay {
            tokio::time::sleep(delay).await;
        }

        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(ChatReply::plain("Mock response")),
        }
    }

    async fn request_human(&self, submission: &HandoffSubmission) -> Result<HandoffReceipt> {
        let mut state = self.lock();
        state.handoff_requests.push(submission.clone());
        match state.handoff_replies.pop_front() {
            Some(Ok(receipt)) => Ok(receipt),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(HandoffReceipt {
                success: true,
                reference_number: Some("MOCK0001".to_string()),
                message: None,
            }),
        }
    }
}
