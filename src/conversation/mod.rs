// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation state for the active session
//!
//! [`ConversationStore`] owns the ordered message log. It is replaced
//! wholesale by hydration or reset and otherwise only ever appended to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::i18n::Language;
use crate::service::{ChatService, HistoryEntry};
use crate::session::SessionId;

/// Id of the seeded greeting message
pub const GREETING_ID: &str = "1";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    /// The greeting that seeds an empty conversation
    pub fn greeting(language: Language) -> Self {
        Self {
            id: GREETING_ID.to_string(),
            text: language.strings().greeting.to_string(),
            origin: Origin::Assistant,
            timestamp: Utc::now(),
        }
    }
}

impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            text: entry.content,
            origin: if entry.is_user {
                Origin::User
            } else {
                Origin::Assistant
            },
            timestamp: entry.timestamp,
        }
    }
}

/// Which path a hydration took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Remote history replaced the local log
    Restored(usize),
    /// The service had no history; the log holds only the greeting
    Greeting,
    /// The history could not be loaded; the log holds only the greeting
    Fallback,
}

#[derive(Debug, Default)]
struct Log {
    messages: Vec<Message>,
    /// Last client-issued id, in epoch millis
    last_issued: i64,
}

/// Ordered message log of the active session
#[derive(Debug, Default)]
pub struct ConversationStore {
    log: Mutex<Log>,
}

impl ConversationStore {
    /// Create an empty store. It becomes non-empty once hydrated or reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding only the greeting for `language`
    pub fn seeded(language: Language) -> Self {
        let store = Self::new();
        store.reset(language);
        store
    }

    /// Replace the log with the session's remote history.
    ///
    /// An empty history and an unreachable one look the same to the user at
    /// this layer; both leave exactly one greeting in `language`.
    pub async fn hydrate(
        &self,
        service: &dyn ChatService,
        session_id: &SessionId,
        language: Language,
    ) -> HydrationOutcome {
        match service.conversation_history(session_id.as_str()).await {
            Ok(entries) if !entries.is_empty() => {
                let count = entries.len();
                self.lock().messages = entries.into_iter().map(Message::from).collect();
                tracing::debug!(session_id = %session_id, count, "Restored conversation history");
                HydrationOutcome::Restored(count)
            }
            Ok(_) => {
                self.reset(language);
                HydrationOutcome::Greeting
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "No previous history or error loading it");
                self.reset(language);
                HydrationOutcome::Fallback
            }
        }
    }

    /// Add a message to the end of the log. Nothing is sent remotely.
    pub fn append(&self, message: Message) {
        self.lock().messages.push(message);
    }

    /// Build a client-issued message and append it. Returns the stored copy.
    pub fn append_new(&self, origin: Origin, text: impl Into<String>) -> Message {
        let mut log = self.lock();
        let id = log.next_id();
        let timestamp = log.next_timestamp();
        let message = Message {
            id,
            text: text.into(),
            origin,
            timestamp,
        };
        log.messages.push(message.clone());
        message
    }

    /// Append a purely local assistant notice with a caller-chosen id.
    pub fn append_local_notice(&self, id: impl Into<String>, text: impl Into<String>) -> Message {
        let mut log = self.lock();
        let timestamp = log.next_timestamp();
        let message = Message {
            id: id.into(),
            text: text.into(),
            origin: Origin::Assistant,
            timestamp,
        };
        log.messages.push(message.clone());
        message
    }

    /// Clear the log and seed it with the greeting for `language`
    pub fn reset(&self, language: Language) {
        let mut log = self.lock();
        log.messages.clear();
        log.messages.push(Message::greeting(language));
    }

    /// Copy of the current log, in order
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// The most recent message, if any
    pub fn last(&self) -> Option<Message> {
        self.lock().messages.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Conversation lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl Log {
    /// Timestamp-based id, bumped past the previous one so two messages
    /// created in the same millisecond stay distinct.
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_issued = now.max(self.last_issued + 1);
        self.last_issued.to_string()
    }

    /// Current time, never earlier than the last message in the log.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::{history_entry, MockChatService, MockFailure};
    use chrono::TimeZone;

    fn session() -> SessionId {
        SessionId::parse("careline_1700000000000_abcdefghi").unwrap()
    }

    #[tokio::test]
    async fn test_hydrate_replaces_with_remote_history() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let service = MockChatService::new().with_history(vec![
            history_entry("10", "When is my consultation?", true, t0),
            history_entry("11", "Tomorrow at 10am.", false, t0 + chrono::Duration::seconds(1)),
        ]);
        let store = ConversationStore::seeded(Language::En);
        store.append_new(Origin::User, "local only");

        let outcome = store.hydrate(&service, &session(), Language::En).await;

        assert_eq!(outcome, HydrationOutcome::Restored(2));
        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "10");
        assert_eq!(messages[0].origin, Origin::User);
        assert_eq!(messages[1].text, "Tomorrow at 10am.");
        assert_eq!(messages[1].origin, Origin::Assistant);
        assert!(!messages.iter().any(|m| m.id == GREETING_ID));
        assert_eq!(service.history_requests(), vec![session().to_string()]);
    }

    #[tokio::test]
    async fn test_hydrate_empty_history_seeds_greeting() {
        let service = MockChatService::new().with_history(vec![]);
        let store = ConversationStore::new();

        let outcome = store.hydrate(&service, &session(), Language::Ta).await;

        assert_eq!(outcome, HydrationOutcome::Greeting);
        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].origin, Origin::Assistant);
        assert_eq!(messages[0].text, Language::Ta.strings().greeting);
    }

    #[tokio::test]
    async fn test_hydrate_failure_falls_back_to_greeting() {
        for failure in [
            MockFailure::Transport,
            MockFailure::Timeout,
            MockFailure::Malformed,
            MockFailure::Status {
                status: 500,
                message: None,
            },
        ] {
            let service = MockChatService::new().with_history_failure(failure);
            let store = ConversationStore::seeded(Language::En);
            store.append_new(Origin::User, "stale");

            let outcome = store.hydrate(&service, &session(), Language::En).await;

            assert_eq!(outcome, HydrationOutcome::Fallback);
            let messages = store.messages();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].text, Language::En.strings().greeting);
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let store = ConversationStore::seeded(Language::En);
        store.append_new(Origin::User, "first");
        store.append_new(Origin::Assistant, "second");
        store.append_new(Origin::User, "third");

        let texts: Vec<_> = store.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(
            texts,
            vec![Language::En.strings().greeting, "first", "second", "third"]
        );
    }

    #[test]
    fn test_client_ids_unique_and_timestamps_monotonic() {
        let store = ConversationStore::new();
        for i in 0..50 {
            store.append_new(Origin::User, format!("m{}", i));
        }
        let messages = store.messages();
        let mut ids: Vec<_> = messages.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(messages
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_timestamp_never_goes_backwards_after_future_entry() {
        let store = ConversationStore::new();
        let future = Utc::now() + chrono::Duration::hours(1);
        store.append(Message {
            id: "srv".to_string(),
            text: "from server clock".to_string(),
            origin: Origin::Assistant,
            timestamp: future,
        });
        let next = store.append_new(Origin::User, "hi");
        assert!(next.timestamp >= future);
    }

    #[test]
    fn test_reset_leaves_only_greeting() {
        let store = ConversationStore::seeded(Language::En);
        store.append_new(Origin::User, "hello");
        store.reset(Language::Ta);

        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, GREETING_ID);
        assert_eq!(messages[0].text, Language::Ta.strings().greeting);
    }

    #[test]
    fn test_local_notice_is_assistant() {
        let store = ConversationStore::seeded(Language::En);
        let notice = store.append_local_notice("greeting-ta", "Language changed");
        assert_eq!(notice.origin, Origin::Assistant);
        assert_eq!(store.last().unwrap().id, "greeting-ta");
        assert_eq!(store.len(), 2);
    }
}
