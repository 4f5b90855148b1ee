// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Careline - customer support chat client.
//!
//! This crate exposes the client core used by the `careline` CLI
//! (`src/main.rs`):
//! - `session`, `store`: durable client identity and language preference
//! - `service`: the remote chat service contract and its HTTP implementation
//! - `conversation`: the ordered message log of the active session
//! - `chat`: the send protocol, slash commands and the screen controller
//! - `handoff`: collecting contact details for a human agent
//! - `i18n`: supported languages and their UI text

pub mod chat;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handoff;
pub mod i18n;
pub mod service;
pub mod session;
pub mod store;

pub use error::{CarelineError, Result};
