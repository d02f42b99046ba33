//! GoBarber Form Validation
//!
//! Every form the client submits is checked locally before any request is
//! made. Validation never stops at the first bad field: all failing fields
//! are reported so a UI can mark each of them.

mod error;
mod forms;
mod rules;

pub use error::ValidationErrors;
pub use forms::{
    reset_token_from_query, ForgotPasswordForm, ProfileForm, ResetPasswordForm, SignInForm,
    SignUpForm,
};

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}
