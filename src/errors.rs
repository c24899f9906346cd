// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Error Handling
//!
//! This module defines the error taxonomy shared by the progression engine,
//! the persistence gateway, and the HTTP surface. Validation failures leave
//! the tracker state untouched; persistence failures are surfaced exactly
//! once and never retried automatically.

use serde::Serialize;
use thiserror::Error;

/// Convenience alias used by the engine and the persistence gateway
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors raised by tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A required field was missing or invalid; no mutation occurred
    #[error("validation failed: {0}")]
    Validation(String),

    /// Loading or saving the tracker state failed
    #[error("persistence failed")]
    Persistence {
        #[from]
        source: sqlx::Error,
    },

    /// Persisted data could not be interpreted as a tracker snapshot
    #[error("corrupt tracker state: {0}")]
    State(String),
}

impl TrackerError {
    /// Validation failure with a caller-facing message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Corrupt-snapshot failure raised while decoding stored rows
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Persistence { .. } | Self::State(_) => 500,
        }
    }

    /// Stable machine-readable error kind for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Persistence { .. } => "persistence_error",
            Self::State(_) => "state_error",
        }
    }

    /// Build the JSON body returned to HTTP clients
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// JSON error body returned by the HTTP surface
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = TrackerError::validation("distance is required");
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.kind(), "validation_error");
        assert!(err.to_string().contains("distance is required"));
    }

    #[test]
    fn test_persistence_maps_to_server_error() {
        let err = TrackerError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.kind(), "persistence_error");
    }

    #[test]
    fn test_state_maps_to_server_error() {
        let err = TrackerError::state("unknown badge id 'turbo_tortoise'");
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.kind(), "state_error");
    }

    #[test]
    fn test_error_response_body() {
        let body = TrackerError::validation("feeling is required").to_response();
        assert_eq!(body.error, "validation_error");
        assert!(body.message.contains("feeling is required"));
    }
}
