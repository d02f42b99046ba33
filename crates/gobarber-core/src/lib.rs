//! GoBarber Core
//!
//! Coordination layer for the booking client. Owns the session store, the
//! API client and local storage, and exposes the operations a UI drives.

mod app;
mod config;
mod context;
mod error;

pub use app::GoBarber;
pub use config::Config;
pub use context::AppContext;
pub use error::CoreError;

pub use gobarber_api::{Appointment, ApiClient, ApiError, Customer, MonthAvailabilityItem};
pub use gobarber_forms::{
    ForgotPasswordForm, ProfileForm, ResetPasswordForm, SignInForm, SignUpForm, Validate,
    ValidationErrors,
};
pub use gobarber_schedule::{next_work_day, Calendar, DaySchedule, ScheduledAppointment};
pub use gobarber_session::{AuthState, SessionError, SessionStore, SubscriptionId, UserProfile};
pub use gobarber_storage::{Database, KeyValueStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
