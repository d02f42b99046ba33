//! Session data structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Profile of the signed-in person as returned by the backend.
///
/// Fields the client does not know about are kept in `extra` so that
/// persisting and restoring a profile never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar_url: None,
            extra: Map::new(),
        }
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// An authenticated identity. Token and user only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Opaque bearer credential
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserProfile,
}

impl From<SignInResponse> for Session {
    fn from(response: SignInResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}
