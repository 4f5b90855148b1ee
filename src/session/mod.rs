// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session identity
//!
//! A session correlates this client installation with its server-side
//! conversation. The id is generated once, persisted, and only ever replaced
//! by an explicit "start new chat".

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CarelineError, Result};
use crate::i18n::Language;

pub mod manager;

pub use manager::SessionManager;

/// Length of the random suffix of generated ids
const SUFFIX_LEN: usize = 9;

/// Opaque session identifier: `<namespace>_<epoch-millis>_<random-alnum>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id. The millisecond timestamp keeps ids unique within
    /// a process; the random suffix covers ids minted in the same millisecond.
    pub fn generate(namespace: &str) -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        Self(format!("{}_{}_{}", namespace, millis, suffix))
    }

    /// Wrap a stored or user-supplied id.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CarelineError::Session(
                "Session ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id has the shape produced by [`SessionId::generate`].
    pub fn is_generated_by(&self, namespace: &str) -> bool {
        let Some(rest) = self
            .0
            .strip_prefix(namespace)
            .and_then(|r| r.strip_prefix('_'))
        else {
            return false;
        };
        let Some((millis, suffix)) = rest.split_once('_') else {
            return false;
        };
        !millis.is_empty()
            && millis.chars().all(|c| c.is_ascii_digit())
            && suffix.len() == SUFFIX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    }

    /// Trailing characters of the id, for compact display.
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The resolved identity and language of the running client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub language: Language,
}
