// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session lifecycle: load-or-create on startup, replace on "start new chat".
//!
//! Storage failures never escape this module. If the store cannot be read
//! or written the manager still hands out a usable in-memory session.

use std::sync::Arc;

use crate::i18n::Language;
use crate::store::{KeyValueStore, LANGUAGE_KEY, SESSION_ID_KEY};

use super::{Session, SessionId};

/// Owns the identity of the running client
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            current: None,
        }
    }

    /// The resolved session, once [`initialize`](Self::initialize) has run.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Load the persisted session, creating and persisting whatever is missing.
    pub async fn initialize(&mut self) -> Session {
        let stored_id = match self.store.get(SESSION_ID_KEY).await {
            Ok(value) => value.and_then(|v| SessionId::parse(&v).ok()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session id, using a new in-memory session");
                None
            }
        };

        let id = match stored_id {
            Some(id) => {
                tracing::debug!(session_id = %id, "Restored session");
                id
            }
            None => {
                let id = SessionId::generate(&self.namespace);
                self.persist(SESSION_ID_KEY, id.as_str()).await;
                tracing::info!(session_id = %id, "Created new session");
                id
            }
        };

        let stored_language = match self.store.get(LANGUAGE_KEY).await {
            Ok(value) => value.as_deref().and_then(Language::from_code),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read language preference");
                None
            }
        };

        let language = match stored_language {
            Some(language) => language,
            None => {
                let language = Language::default();
                self.persist(LANGUAGE_KEY, language.code()).await;
                language
            }
        };

        let session = Session { id, language };
        self.current = Some(session.clone());
        session
    }

    /// Replace the session id after the caller confirms. The language is kept.
    ///
    /// Returns `None` (and changes nothing) when `confirm` declines.
    pub async fn reset<F>(&mut self, confirm: F) -> Option<Session>
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            tracing::debug!("Session reset declined");
            return None;
        }

        let language = self
            .current
            .as_ref()
            .map(|s| s.language)
            .unwrap_or_default();
        let id = SessionId::generate(&self.namespace);
        self.persist(SESSION_ID_KEY, id.as_str()).await;

        let previous = self.current.as_ref().map(|s| s.id.to_string());
        tracing::info!(session_id = %id, previous = ?previous, "Started new session");

        let session = Session { id, language };
        self.current = Some(session.clone());
        Some(session)
    }

    /// Switch the active language and persist the preference.
    pub async fn set_language(&mut self, language: Language) -> Option<Session> {
        let session = self.current.as_mut()?;
        session.language = language;
        let session = session.clone();
        self.persist(LANGUAGE_KEY, language.code()).await;
        Some(session)
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            tracing::warn!(key, error = %e, "Failed to persist session state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CarelineError, Result};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CarelineError::Storage("unreadable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CarelineError::Storage("unwritable".to_string()))
        }
    }

    fn manager_with(store: &MemoryStore) -> SessionManager {
        SessionManager::new(Arc::new(store.clone()), "careline")
    }

    #[tokio::test]
    async fn test_fresh_install_creates_and_persists() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store);

        let session = manager.initialize().await;

        assert!(session.id.is_generated_by("careline"));
        assert_eq!(session.language, Language::En);
        assert_eq!(store.peek(SESSION_ID_KEY).as_deref(), Some(session.id.as_str()));
        assert_eq!(store.peek(LANGUAGE_KEY).as_deref(), Some("en"));
        assert_eq!(manager.current(), Some(&session));
    }

    #[tokio::test]
    async fn test_initialize_is_stable() {
        let store = MemoryStore::new();
        let first = manager_with(&store).initialize().await;
        let second = manager_with(&store).initialize().await;
        let mut same_manager = manager_with(&store);
        let third = same_manager.initialize().await;
        let fourth = same_manager.initialize().await;

        assert_eq!(first.id, second.id);
        assert_eq!(first.id, third.id);
        assert_eq!(third, fourth);
    }

    #[tokio::test]
    async fn test_restores_stored_values() {
        let store = MemoryStore::with_entries([
            (SESSION_ID_KEY, "astrotamil_1700000000000_abc123xyz"),
            (LANGUAGE_KEY, "ta"),
        ]);
        let session = manager_with(&store).initialize().await;

        assert_eq!(session.id.as_str(), "astrotamil_1700000000000_abc123xyz");
        assert_eq!(session.language, Language::Ta);
    }

    #[tokio::test]
    async fn test_unsupported_language_replaced_by_default() {
        let store = MemoryStore::with_entries([(LANGUAGE_KEY, "fr")]);
        let session = manager_with(&store).initialize().await;

        assert_eq!(session.language, Language::En);
        assert_eq!(store.peek(LANGUAGE_KEY).as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_broken_store_still_yields_session() {
        let mut manager = SessionManager::new(Arc::new(BrokenStore), "careline");
        let session = manager.initialize().await;

        assert!(session.id.is_generated_by("careline"));
        assert_eq!(session.language, Language::En);

        let reset = manager.reset(|| true).await.expect("confirmed reset");
        assert_ne!(reset.id, session.id);
    }

    #[tokio::test]
    async fn test_reset_generates_new_id_and_keeps_language() {
        let store = MemoryStore::with_entries([(LANGUAGE_KEY, "ta")]);
        let mut manager = manager_with(&store);
        let original = manager.initialize().await;

        let reset = manager.reset(|| true).await.expect("confirmed reset");

        assert_ne!(reset.id, original.id);
        assert_eq!(reset.language, Language::Ta);
        assert_eq!(store.peek(SESSION_ID_KEY).as_deref(), Some(reset.id.as_str()));

        let reloaded = manager_with(&store).initialize().await;
        assert_eq!(reloaded.id, reset.id);
    }

    #[tokio::test]
    async fn test_declined_reset_changes_nothing() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store);
        let original = manager.initialize().await;

        assert!(manager.reset(|| false).await.is_none());
        assert_eq!(manager.current(), Some(&original));
        assert_eq!(store.peek(SESSION_ID_KEY).as_deref(), Some(original.id.as_str()));
    }

    #[tokio::test]
    async fn test_set_language_persists() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store);
        let original = manager.initialize().await;

        let updated = manager.set_language(Language::Ta).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.language, Language::Ta);
        assert_eq!(store.peek(LANGUAGE_KEY).as_deref(), Some("ta"));
    }

    #[tokio::test]
    async fn test_set_language_before_initialize_is_none() {
        let store = MemoryStore::new();
        let mut manager = manager_with(&store);
        assert!(manager.set_language(Language::Ta).await.is_none());
        assert_eq!(store.peek(LANGUAGE_KEY), None);
    }
}
