//! GoBarber API Client
//!
//! Typed wrappers over the booking backend's REST endpoints. The client
//! also serves as the session store's authentication backend.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    Appointment, Customer, MonthAvailabilityItem, NewUser, PasswordChange, ProfileUpdate,
    ResetPassword,
};

pub type Result<T> = std::result::Result<T, ApiError>;
