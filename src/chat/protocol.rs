// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Request/response contract for sending a user message
//!
//! A send always leaves the conversation with the user's message followed
//! by exactly one assistant message: the reply, or an error text when the
//! exchange failed. Only one send may be outstanding at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::conversation::{ConversationStore, Message, Origin};
use crate::error::{ApiError, CarelineError};
use crate::i18n::{Language, LanguageStrings};
use crate::service::{ChatRequest, ChatService, ReplyKind};
use crate::session::SessionId;

/// A modal notice the front end should raise next to the error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The service was unreachable or failed on its side
    Connectivity(String),
    /// The service rejected the request and said why
    Validation(String),
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::Connectivity(_) => "Server Error",
            Alert::Validation(_) => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Alert::Connectivity(m) | Alert::Validation(m) => m,
        }
    }
}

/// Handoff activation scheduled by a collect-details reply.
///
/// The delay lets the reply render before the details form appears. Only
/// [`ChatProtocolClient::send`] creates one, and only for a collect-details
/// reply; it remembers the session it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledActivation {
    deadline: Instant,
    session_id: SessionId,
}

impl ScheduledActivation {
    pub(crate) fn after(delay: Duration, session_id: SessionId) -> Self {
        Self {
            deadline: Instant::now() + delay,
            session_id,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Session the triggering reply belonged to
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn is_due(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Wait until the activation is due.
    pub async fn wait(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }
}

/// Result of [`ChatProtocolClient::send`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input; nothing happened
    Ignored,
    /// Another send is outstanding; nothing happened
    Busy,
    /// The assistant replied; the reply was appended
    Replied {
        reply: Message,
        kind: ReplyKind,
        handoff: Option<ScheduledActivation>,
    },
    /// The exchange failed; an error message was appended
    Failed {
        message: Message,
        alert: Option<Alert>,
    },
}

/// Sends user messages to the chat service and records the exchange
pub struct ChatProtocolClient {
    service: Arc<dyn ChatService>,
    handoff_delay: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatProtocolClient {
    pub fn new(service: Arc<dyn ChatService>, handoff_delay: Duration) -> Self {
        Self {
            service,
            handoff_delay,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a send is currently outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    /// Send `text` as the user. The user message is appended before the
    /// request goes out; the reply or error is appended when it resolves.
    pub async fn send(
        &self,
        conversation: &ConversationStore,
        session_id: &SessionId,
        text: &str,
        language: Language,
    ) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Send ignored, another message is in flight");
            return SendOutcome::Busy;
        };

        conversation.append_new(Origin::User, text);

        let request = ChatRequest {
            session_id: session_id.to_string(),
            message: text.to_string(),
            language: language.code().to_string(),
        };

        match self.service.send_message(&request).await {
            Ok(reply) => {
                let message = conversation.append_new(Origin::Assistant, reply.text);
                let handoff = match reply.kind {
                    ReplyKind::CollectHumanDetails => {
                        tracing::debug!(
                            delay_ms = self.handoff_delay.as_millis() as u64,
                            "Scheduling handoff details form"
                        );
                        Some(ScheduledActivation::after(
                            self.handoff_delay,
                            session_id.clone(),
                        ))
                    }
                    ReplyKind::Plain => None,
                };
                SendOutcome::Replied {
                    reply: message,
                    kind: reply.kind,
                    handoff,
                }
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Error sending message");
                let (text, alert) = classify_failure(&e, language.strings());
                let message = conversation.append_new(Origin::Assistant, text);
                SendOutcome::Failed { message, alert }
            }
        }
    }
}

/// Pick the assistant text and alert for a failed send.
fn classify_failure(err: &CarelineError, strings: &LanguageStrings) -> (String, Option<Alert>) {
    let connectivity = || {
        (
            strings.error.to_string(),
            Some(Alert::Connectivity(strings.connection_error.to_string())),
        )
    };

    match err {
        CarelineError::Api(api) if api.is_connectivity() => connectivity(),
        CarelineError::Api(ApiError::ClientError {
            message: Some(reason),
            ..
        }) => (reason.clone(), Some(Alert::Validation(reason.clone()))),
        CarelineError::Http(e)
            if e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| s.is_server_error()) =>
        {
            connectivity()
        }
        _ => (strings.error.to_string(), None),
    }
}
