//! Session Store
//!
//! Owns the in-memory session and mirrors it to local storage.
//! Storage is written before memory so a crash between the two can only
//! leave memory behind storage, which the next `restore` repairs. A failed
//! write clears the stored session instead of leaving half of one behind.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gobarber_storage::KeyValueStore;

use crate::backend::AuthBackend;
use crate::error::SessionError;
use crate::session::{Credentials, Session, UserProfile};
use crate::state::{AuthState, TOKEN_KEY, USER_KEY};
use crate::Result;

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct SessionStore {
    /// Authoritative session for this process
    state: Arc<RwLock<AuthState>>,
    /// Persistent mirror of `state`
    storage: Arc<dyn KeyValueStore>,
    /// Issues tokens in exchange for credentials
    backend: Arc<dyn AuthBackend>,
    /// Serialises storage+memory commits across clones
    commit: Arc<Mutex<()>>,
    listeners: Arc<RwLock<Vec<(SubscriptionId, Listener)>>>,
    next_listener_id: Arc<AtomicU64>,
}

impl SessionStore {
    /// Build the store, restoring whatever session the last run persisted.
    pub fn new(storage: Arc<dyn KeyValueStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let state = AuthState::restore(storage.as_ref());

        tracing::info!(state = %state, "Initialized session store");

        Self {
            state: Arc::new(RwLock::new(state)),
            storage,
            backend,
            commit: Arc::new(Mutex::new(())),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Nothing is written unless the backend answers with a token and user.
    /// The lock is not held across the request, so readers keep seeing the
    /// previous state until the call resolves.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<()> {
        tracing::debug!(email = %credentials.email, "Signing in");

        let response = match self.backend.create_session(credentials).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(email = %credentials.email, error = %e, "Sign-in failed");
                return Err(e.into());
            }
        };

        let raw_user = serde_json::to_string(&response.user)?;
        let session = Session::from(response);
        let user_id = session.user.id.clone();

        let snapshot = {
            let _commit = self.commit.lock();
            self.persist_session(Some(&session.token), &raw_user);

            let mut state = self.state.write();
            *state = AuthState::Authenticated(session);
            state.clone()
        };

        tracing::info!(user_id = %user_id, "Signed in");
        self.notify(&snapshot);

        Ok(())
    }

    /// Drop the session from memory and storage. Purely local and idempotent.
    pub fn sign_out(&self) {
        let was_authenticated = {
            let _commit = self.commit.lock();
            self.clear_persisted();

            let mut state = self.state.write();
            std::mem::take(&mut *state).is_authenticated()
        };

        if was_authenticated {
            tracing::info!("Signed out");
            self.notify(&AuthState::Unauthenticated);
        }
    }

    /// Replace the profile of the current session, keeping its token.
    pub fn update_user(&self, user: UserProfile) -> Result<()> {
        let raw_user = serde_json::to_string(&user)?;
        let user_id = user.id.clone();

        let snapshot = {
            let _commit = self.commit.lock();
            if !self.state.read().is_authenticated() {
                return Err(SessionError::InvalidState(
                    "cannot update user without an active session".to_string(),
                ));
            }

            self.persist_session(None, &raw_user);

            let mut state = self.state.write();
            if let AuthState::Authenticated(session) = &mut *state {
                session.user = user;
            }
            state.clone()
        };

        tracing::info!(user_id = %user_id, "Updated session user");
        self.notify(&snapshot);

        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().user().cloned()
    }

    /// Bearer token for authenticated API calls
    pub fn token(&self) -> Option<String> {
        self.state.read().token().map(str::to_string)
    }

    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    /// Register a listener called with the new state after every mutation.
    pub fn on_change<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn notify(&self, state: &AuthState) {
        // Snapshot so listeners may call back into the store
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(state);
        }
    }

    /// Mirror a session to storage. `token` is `None` when only the user
    /// changes. Any failed write drops the stored session entirely, so a
    /// restart never pairs a token with another session's user.
    fn persist_session(&self, token: Option<&str>, raw_user: &str) {
        let written = match token {
            Some(token) => self.storage.set_item(TOKEN_KEY, token),
            None => Ok(()),
        }
        .and_then(|()| self.storage.set_item(USER_KEY, raw_user));

        if let Err(e) = written {
            tracing::warn!(error = %e, "Failed to persist session, clearing stored copy");
            self.clear_persisted();
        }
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!(key = %key, error = %e, "Failed to remove persisted session value");
            }
        }
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            storage: Arc::clone(&self.storage),
            backend: Arc::clone(&self.backend),
            commit: Arc::clone(&self.commit),
            listeners: Arc::clone(&self.listeners),
            next_listener_id: Arc::clone(&self.next_listener_id),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state.read().as_str())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
