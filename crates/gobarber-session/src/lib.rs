//! GoBarber Session Management
//!
//! - A session is the pair (token, user) issued by `POST /sessions`
//! - Both halves are persisted to local storage and restored at startup
//! - In-memory state is authoritative; storage is a best-effort mirror
//! - Subscribers are notified after every successful mutation

mod backend;
mod error;
mod session;
mod state;
mod store;

pub use backend::{AuthBackend, BackendError};
pub use error::SessionError;
pub use session::{Credentials, Session, SignInResponse, UserProfile};
pub use state::{AuthState, TOKEN_KEY, USER_KEY};
pub use store::{SessionStore, SubscriptionId};

pub type Result<T> = std::result::Result<T, SessionError>;
