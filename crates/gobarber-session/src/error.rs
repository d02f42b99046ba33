//! Session error types

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Storage error: {0}")]
    Storage(#[from] gobarber_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, message } => {
                SessionError::AuthenticationFailed(format!("{message} (status {status})"))
            }
            BackendError::Transport(message) => SessionError::Network(message),
        }
    }
}
