// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{CarelineError, Result};

use super::Settings;

impl Settings {
    /// Get the chat service base URL, checking env var first.
    /// Trailing slashes are stripped so endpoint paths can be appended.
    pub fn get_base_url(&self) -> String {
        // Priority: env var > config file.
        // An empty env var name disables the override.
        let from_env = Some(self.service.base_url_env.as_str())
            .filter(|name| !name.is_empty())
            .and_then(|name| std::env::var(name).ok())
            .filter(|v| !v.trim().is_empty());
        let url = from_env.unwrap_or_else(|| self.service.base_url.clone());
        url.trim().trim_end_matches('/').to_string()
    }

    /// Check the settings for values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.get_base_url();
        if base_url.is_empty() {
            return Err(CarelineError::Config(
                "service.base_url must not be empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CarelineError::Config(format!(
                "service.base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.service.timeout_secs == 0 {
            return Err(CarelineError::Config(
                "service.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.id_namespace.trim().is_empty() {
            return Err(CarelineError::Config(
                "session.id_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
