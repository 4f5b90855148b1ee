// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for careline
//!
//! Handles loading and saving settings from ~/.careline/settings.json

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod io;
mod validation;

/// Main settings structure, stored in ~/.careline/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Remote chat service connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session identity settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Human agent handoff settings
    #[serde(default)]
    pub handoff: HandoffConfig,
}

/// Connection settings for the remote chat service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Base URL the endpoint paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable that overrides `base_url`
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Session id generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Prefix of generated session ids
    #[serde(default = "default_id_namespace")]
    pub id_namespace: String,
}

/// Handoff workflow timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandoffConfig {
    /// Delay between a collect-details reply and opening the details form
    #[serde(default = "default_activation_delay_ms")]
    pub activation_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_url_env: default_base_url_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id_namespace: default_id_namespace(),
        }
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            activation_delay_ms: default_activation_delay_ms(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HandoffConfig {
    /// Activation delay as a `Duration`.
    pub fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_base_url_env() -> String {
    "CARELINE_API_URL".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_id_namespace() -> String {
    "careline".to_string()
}

fn default_activation_delay_ms() -> u64 {
    500
}
