//! Error types for the reporting workflow

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Record store errors
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record collection {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Feedback references unknown incident: {0}")]
    UnknownIncident(String),
}

// ============================================================================
// Session errors
// ============================================================================

#[derive(Debug, Error)]
pub enum EmergencyError {
    /// The input stream ended while a mandatory answer was pending
    #[error("Input ended before the required information was provided")]
    InputExhausted,

    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EmergencyError {
    /// Whether the session must stop instead of moving on to the next iteration
    pub fn is_fatal(&self) -> bool {
        matches!(self, EmergencyError::InputExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_input_exhaustion_is_fatal() {
        assert!(EmergencyError::InputExhausted.is_fatal());
        assert!(!EmergencyError::Config("x".into()).is_fatal());
        assert!(!EmergencyError::Store(StoreError::UnknownIncident("abc".into())).is_fatal());
    }

    #[test]
    fn test_store_error_mentions_path() {
        let err = StoreError::Io {
            path: PathBuf::from("logs/emergency_history.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("logs/emergency_history.json"));
    }
}
