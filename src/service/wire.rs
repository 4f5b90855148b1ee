// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! JSON payloads of the chat service and their conversion into the typed
//! values of [`super`]. Missing or mistyped fields are rejected here.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;

use super::{ChatReply, HandoffReceipt, HistoryEntry, ReplyKind};

/// Identifiers arrive as strings or integers depending on the backend model.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    messages: Option<Vec<HistoryMessage>>,
}

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    id: WireId,
    content: String,
    is_user: bool,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    ai_response: Option<String>,
    #[serde(default)]
    response_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HandoffResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    reference_number: Option<WireId>,
    #[serde(default)]
    ticket_id: Option<WireId>,
    #[serde(default)]
    message: Option<String>,
}

impl HistoryResponse {
    pub(crate) fn into_entries(self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.messages
            .unwrap_or_default()
            .into_iter()
            .map(|msg| {
                Ok(HistoryEntry {
                    id: msg.id.into_string(),
                    timestamp: parse_timestamp(&msg.timestamp)?,
                    content: msg.content,
                    is_user: msg.is_user,
                })
            })
            .collect()
    }
}

impl ChatResponse {
    pub(crate) fn into_reply(self) -> Result<ChatReply, ApiError> {
        let text = self.ai_response.ok_or_else(|| {
            ApiError::InvalidResponse("chat response is missing 'ai_response'".to_string())
        })?;
        Ok(ChatReply {
            text,
            kind: ReplyKind::from_response_type(self.response_type.as_deref()),
        })
    }
}

impl HandoffResponse {
    pub(crate) fn into_receipt(self) -> HandoffReceipt {
        HandoffReceipt {
            success: self.success,
            reference_number: self
                .reference_number
                .or(self.ticket_id)
                .map(WireId::into_string),
            message: self.message,
        }
    }
}

/// Parse an RFC 3339 timestamp, accepting naive ISO-8601 values as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::InvalidResponse(format!("invalid timestamp '{}'", raw)))
}

/// Pull a human-readable reason out of an error body (`error` or `message`).
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .filter_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
