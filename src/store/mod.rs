// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Persistent key-value storage
//!
//! Durable storage of the few scalar strings the client keeps between runs
//! (session id, language preference).

use async_trait::async_trait;

use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key for the active session id
pub const SESSION_ID_KEY: &str = "session_id";

/// Storage key for the language preference
pub const LANGUAGE_KEY: &str = "language";

/// Durable string storage keyed by name
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` means the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
