use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::window_types::WindowId;

pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Error)]
pub enum WindowError {
    /// The id was never registered. This is a caller bug, not a runtime condition.
    #[error("Unknown window id: {0}")]
    UnknownWindow(WindowId),

    #[error("Failed to create window {id}: {reason}")]
    Host { id: WindowId, reason: String },

    /// Another caller is building this singleton right now.
    #[error("Window {0} is already opening")]
    Opening(WindowId),
}

#[derive(Debug, Error)]
#[error("Failed to load {url}: {reason}")]
pub struct NavigationError {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read preference state {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preference state {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preference state {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize preference state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("appearance oracle closed")]
    OracleClosed,

    #[error("subscriber sink closed: {0}")]
    SinkClosed(String),
}

/// Failure shape that crosses the procedure boundary. Never carries internal details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: &'static str,
    pub message: String,
}

impl BridgeError {
    pub fn internal(message: &str) -> Self {
        Self {
            code: INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }

    pub fn not_found(message: String) -> Self {
        Self {
            code: NOT_FOUND,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_serializes_code_and_message_only() {
        let error = BridgeError::internal("Failed to load themeSource");
        let json = serde_json::to_value(&error).expect("bridge error should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "code": "INTERNAL_SERVER_ERROR",
                "message": "Failed to load themeSource",
            })
        );
    }

    #[test]
    fn unknown_window_error_names_the_id() {
        let error = WindowError::UnknownWindow(WindowId::from("nonexistent"));
        assert_eq!(error.to_string(), "Unknown window id: nonexistent");
    }
}
