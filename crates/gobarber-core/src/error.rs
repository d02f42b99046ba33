//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] gobarber_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] gobarber_session::SessionError),

    #[error("API error: {0}")]
    Api(#[from] gobarber_api::ApiError),

    #[error(transparent)]
    Validation(#[from] gobarber_forms::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Password reset link has no token")]
    MissingResetToken,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Application not initialized")]
    NotInitialized,
}
