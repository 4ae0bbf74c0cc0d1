//! Error types for the Mamatoto client.
//!
//! # Design
//! Every store action returns `Result<T, ApiError>`; nothing is rethrown
//! through a side channel. The store's `error` field is only a display copy
//! of `ApiError::user_message`.
//!
//! The backend reports failures as `{"detail": "..."}`. Validation failures
//! use FastAPI's list form `{"detail": [{"msg": "..."}]}`. Both shapes are
//! extracted once, when the response is classified, so callers never parse
//! error bodies themselves.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by the HTTP adapter and every store action.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found{}", suffix(.detail))]
    NotFound { detail: Option<String> },

    /// The server returned 401; the bearer token is missing, expired or wrong.
    #[error("unauthorized{}", suffix(.detail))]
    Unauthorized { detail: Option<String> },

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}{}", suffix(.detail))]
    HttpError {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    /// Input was rejected before any request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The session token could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from durable token storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is malformed: {0}")]
    Format(String),
}

fn suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            401 => ApiError::Unauthorized { detail },
            404 => ApiError::NotFound { detail },
            _ => ApiError::HttpError {
                status,
                detail,
                body: body.to_string(),
            },
        }
    }

    /// The server-supplied human-readable message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { detail }
            | ApiError::Unauthorized { detail }
            | ApiError::HttpError { detail, .. } => detail.as_deref(),
            ApiError::Validation(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Message to surface in a store's `error` field.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// True when the backend rejected the session itself.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull `detail` out of a FastAPI-style error body.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
