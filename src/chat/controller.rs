// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat screen controller
//!
//! Wires the session, conversation, send protocol and handoff workflow
//! together behind the operations a front end needs.

use std::sync::Arc;

use crate::config::Settings;
use crate::conversation::{ConversationStore, HydrationOutcome, Message};
use crate::error::{CarelineError, Result};
use crate::handoff::{HandoffOutcome, HandoffWorkflow};
use crate::i18n::Language;
use crate::service::ChatService;
use crate::session::{Session, SessionManager};
use crate::store::KeyValueStore;

use super::protocol::{ChatProtocolClient, ScheduledActivation, SendOutcome};

/// Drives one chat client
pub struct ChatController {
    service: Arc<dyn ChatService>,
    sessions: SessionManager,
    conversation: ConversationStore,
    protocol: ChatProtocolClient,
    handoff: HandoffWorkflow,
    hydration: Option<HydrationOutcome>,
}

impl ChatController {
    pub fn new(
        settings: &Settings,
        service: Arc<dyn ChatService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            sessions: SessionManager::new(store, settings.session.id_namespace.clone()),
            conversation: ConversationStore::new(),
            protocol: ChatProtocolClient::new(
                Arc::clone(&service),
                settings.handoff.activation_delay(),
            ),
            handoff: HandoffWorkflow::new(),
            hydration: None,
            service,
        }
    }

    /// Resolve the session and load its conversation.
    pub async fn start(&mut self) -> Session {
        let session = self.sessions.initialize().await;
        let outcome = self
            .conversation
            .hydrate(self.service.as_ref(), &session.id, session.language)
            .await;
        tracing::debug!(session_id = %session.id, ?outcome, "Chat started");
        self.hydration = Some(outcome);
        session
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// Active language, `en` until the session is started
    pub fn language(&self) -> Language {
        self.session().map(|s| s.language).unwrap_or_default()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// How the conversation was loaded by [`start`](Self::start)
    pub fn hydration(&self) -> Option<HydrationOutcome> {
        self.hydration
    }

    /// Last 8 characters of the session id, for a compact header
    pub fn short_session_label(&self) -> Option<&str> {
        self.session().map(|s| s.id.short())
    }

    /// Send a user message in the active session and language.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        let session = self.require_session()?;
        Ok(self
            .protocol
            .send(&self.conversation, &session.id, text, session.language)
            .await)
    }

    pub fn is_sending(&self) -> bool {
        self.protocol.is_in_flight()
    }

    /// Start over with a fresh session id once `confirm` agrees.
    ///
    /// Any handoff in progress is cancelled and the conversation is reset
    /// to the greeting in the current language.
    pub async fn start_new_chat<F>(&mut self, confirm: F) -> Option<Session>
    where
        F: FnOnce() -> bool,
    {
        let session = self.sessions.reset(confirm).await?;
        self.handoff.cancel();
        self.conversation.reset(session.language);
        self.hydration = None;
        Some(session)
    }

    /// Switch language, persist it and post a local notice in the new language.
    pub async fn change_language(&mut self, language: Language) -> Result<Message> {
        self.require_session()?;
        self.sessions.set_language(language).await;

        let strings = language.strings();
        let text = format!(
            "Language changed to {}. {}",
            strings.display_name, strings.greeting
        );
        let id = format!("greeting-{}", language.code());
        tracing::debug!(language = language.code(), "Language changed");
        Ok(self.conversation.append_local_notice(id, text))
    }

    pub fn handoff(&self) -> &HandoffWorkflow {
        &self.handoff
    }

    pub fn handoff_mut(&mut self) -> &mut HandoffWorkflow {
        &mut self.handoff
    }

    /// Wait for a scheduled activation, then open the details form.
    ///
    /// Returns `false` without activating when the session changed since
    /// the reply that scheduled it.
    pub async fn complete_scheduled_handoff(&mut self, activation: ScheduledActivation) -> bool {
        activation.wait().await;
        if self.session().map(|s| &s.id) != Some(activation.session_id()) {
            tracing::debug!(
                scheduled_for = %activation.session_id(),
                "Dropping handoff activation from a previous session"
            );
            return false;
        }
        self.handoff.activate();
        true
    }

    /// Open the details form on request (the "talk to an agent" action).
    pub fn activate_handoff(&mut self) {
        self.handoff.activate();
    }

    pub fn cancel_handoff(&mut self) {
        self.handoff.cancel();
    }

    /// Submit the collected handoff details for the active session.
    pub async fn submit_handoff(&mut self) -> HandoffOutcome {
        let Some(session) = self.sessions.current() else {
            return HandoffOutcome::NotCollecting;
        };
        let session_id = session.id.clone();
        self.handoff
            .submit(self.service.as_ref(), &session_id, &self.conversation)
            .await
    }

    fn require_session(&self) -> Result<&Session> {
        self.session()
            .ok_or_else(|| CarelineError::Session("chat has not been started".to_string()))
    }
}
