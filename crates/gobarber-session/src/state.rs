//! Authentication state machine
//!
//! ```text
//! Unauthenticated --sign_in--> Authenticated
//! Authenticated --sign_in / update_user--> Authenticated
//! Authenticated --sign_out--> Unauthenticated
//! ```

use gobarber_storage::KeyValueStore;

use crate::session::{Session, UserProfile};

pub const TOKEN_KEY: &str = "@GoBarber:token";
pub const USER_KEY: &str = "@GoBarber:user";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    /// Rebuild the state persisted by a previous run.
    ///
    /// Anything short of a readable token plus a decodable user counts as
    /// signed out. Corrupt values are logged and otherwise ignored.
    pub fn restore(storage: &dyn KeyValueStore) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token");
                return AuthState::Unauthenticated;
            }
        };
        let raw_user = match storage.get_item(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted user");
                return AuthState::Unauthenticated;
            }
        };

        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            return AuthState::Unauthenticated;
        };

        match decode_user(&raw_user) {
            Some(user) => {
                tracing::info!(user_id = %user.id, "Restored persisted session");
                AuthState::Authenticated(Session { token, user })
            }
            None => AuthState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn decode_user(raw: &str) -> Option<UserProfile> {
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding corrupt persisted user");
            None
        }
    }
}
