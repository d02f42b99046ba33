//! Authentication backend seam
//!
//! The store only needs one call from the HTTP layer: exchange credentials
//! for a token and profile. Keeping it behind a trait lets the store be
//! driven by the real API client or by an in-process fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::session::{Credentials, SignInResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered and refused the request.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a usable answer.
    #[error("transport failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<SignInResponse, BackendError>;
}
