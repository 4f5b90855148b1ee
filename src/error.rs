// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for careline
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for careline operations
#[derive(Error, Debug)]
pub enum CarelineError {
    /// Chat service errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Persistent store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session errors
    #[error("Session error: {0}")]
    Session(String),
}

/// Errors reported by the remote chat service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// Response body did not have the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// 5xx (or otherwise unexpected) status from the service
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// 4xx status, with the server-provided reason when the body carried one
    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no reason given"))]
    ClientError {
        status: u16,
        message: Option<String>,
    },
}

impl ApiError {
    /// Whether this failure means the service could not be reached or failed
    /// on its side (transport errors, timeouts, 5xx).
    pub fn is_connectivity(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout => true,
            ApiError::ServerError { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    /// The server-provided reason attached to a 4xx response, if any.
    pub fn client_message(&self) -> Option<&str> {
        match self {
            ApiError::ClientError {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Result type alias for careline operations
pub type Result<T> = std::result::Result<T, CarelineError>;
