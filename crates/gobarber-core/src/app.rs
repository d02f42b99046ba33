//! Main application container
//!
//! All client state flows through here. A UI holds one `GoBarber` (through
//! `AppContext`) and renders whatever it returns.

use chrono::{Datelike, Local, NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;

use gobarber_api::{ApiClient, MonthAvailabilityItem};
use gobarber_forms::{
    reset_token_from_query, ForgotPasswordForm, ProfileForm, ResetPasswordForm, SignInForm,
    SignUpForm, Validate,
};
use gobarber_schedule::{Calendar, DaySchedule};
use gobarber_session::{Credentials, SessionStore, UserProfile};
use gobarber_storage::Database;

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

#[derive(Clone)]
pub struct GoBarber {
    config: Config,
    db: Database,
    /// Signed-in identity, restored at construction
    session: SessionStore,
    /// Unauthenticated client; `authorized()` derives the bearer variant
    api: ApiClient,
}

impl GoBarber {
    /// Open local storage under the configured path and restore the session.
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, config.request_timeout())?;
        let session = SessionStore::new(Arc::new(db.clone()), Arc::new(api.clone()));

        tracing::info!(
            api_url = %config.api_url,
            authenticated = session.is_authenticated(),
            "Initialized GoBarber"
        );

        Ok(Self {
            config,
            db,
            session,
            api,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub async fn sign_in(&self, form: SignInForm) -> Result<UserProfile> {
        form.validate()?;

        let credentials = Credentials::from(form);
        self.session.sign_in(&credentials).await?;

        self.session.current_user().ok_or(CoreError::NotAuthenticated)
    }

    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// Create an account. Does not sign in.
    pub async fn sign_up(&self, form: SignUpForm) -> Result<UserProfile> {
        form.validate()?;

        let user = self.api.create_user(&form.into()).await?;
        tracing::info!(user_id = %user.id, "Created account");

        Ok(user)
    }

    pub async fn forgot_password(&self, form: ForgotPasswordForm) -> Result<()> {
        form.validate()?;

        self.api.forgot_password(&form.email).await?;
        tracing::info!("Requested password recovery email");

        Ok(())
    }

    /// `query` is the query string of the reset link, e.g. `?token=...`.
    pub async fn reset_password(&self, form: ResetPasswordForm, query: &str) -> Result<()> {
        form.validate()?;
        let token = reset_token_from_query(query).ok_or(CoreError::MissingResetToken)?;

        self.api.reset_password(&form.into_request(token)).await?;
        tracing::info!("Password reset");

        Ok(())
    }

    pub async fn update_profile(&self, form: ProfileForm) -> Result<UserProfile> {
        form.validate()?;
        let api = self.authorized()?;

        let user = api.update_profile(&form.into()).await?;
        self.session.update_user(user.clone())?;

        Ok(user)
    }

    pub async fn update_avatar(&self, path: &Path) -> Result<UserProfile> {
        let api = self.authorized()?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("avatar");

        let user = api.update_avatar(file_name, bytes).await?;
        self.session.update_user(user.clone())?;

        Ok(user)
    }

    /// Availability of the signed-in provider for one month.
    pub async fn month_availability(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthAvailabilityItem>> {
        let user = self.current_user().ok_or(CoreError::NotAuthenticated)?;
        let api = self.authorized()?;

        Ok(api.month_availability(&user.id, year, month).await?)
    }

    /// Fetch availability for the calendar's visible month into it.
    pub async fn load_calendar(&self, calendar: &mut Calendar) -> Result<()> {
        let month = calendar.selected_month();
        let items = self.month_availability(month.year(), month.month()).await?;
        calendar.set_month_availability(items);

        Ok(())
    }

    /// The signed-in provider's appointments for `date`, in local time.
    pub async fn day_schedule(&self, date: NaiveDate) -> Result<DaySchedule> {
        let api = self.authorized()?;
        let appointments = api.provider_appointments(date).await?;

        Ok(DaySchedule::build(appointments, &Local, Utc::now()))
    }

    fn authorized(&self) -> Result<ApiClient> {
        let token = self.session.token().ok_or(CoreError::NotAuthenticated)?;
        Ok(self.api.authorized(token))
    }
}
