//! Application context
//!
//! The one place a UI looks the application up. Reaching for it before
//! `install` is a programming error and fails immediately.

use parking_lot::RwLock;
use std::sync::Arc;

use gobarber_session::SessionStore;

use crate::app::GoBarber;
use crate::error::CoreError;
use crate::Result;

#[derive(Clone, Default)]
pub struct AppContext {
    app: Arc<RwLock<Option<GoBarber>>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, app: GoBarber) {
        *self.app.write() = Some(app);
    }

    /// Remove the application, returning it if one was installed.
    pub fn uninstall(&self) -> Option<GoBarber> {
        self.app.write().take()
    }

    pub fn is_installed(&self) -> bool {
        self.app.read().is_some()
    }

    pub fn with_app<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&GoBarber) -> Result<T>,
    {
        let guard = self.app.read();
        match guard.as_ref() {
            Some(app) => f(app),
            None => Err(CoreError::NotInitialized),
        }
    }

    /// Owned handle for use across `.await` points.
    pub fn app(&self) -> Result<GoBarber> {
        self.with_app(|app| Ok(app.clone()))
    }

    pub fn session(&self) -> Result<SessionStore> {
        self.with_app(|app| Ok(app.session().clone()))
    }
}
