//! Form definitions and their schemas

use gobarber_api::{NewUser, PasswordChange, ProfileUpdate, ResetPassword};
use gobarber_session::Credentials;

use crate::error::ValidationErrors;
use crate::rules::Field;
use crate::Validate;

const MIN_PASSWORD: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl Validate for SignInForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Field::new("email", &self.email)
            .required("E-mail required")
            .email("Insert valid e-mail")
            .report(&mut errors);
        Field::new("password", &self.password)
            .required("Password required")
            .report(&mut errors);

        errors.into_result()
    }
}

impl From<SignInForm> for Credentials {
    fn from(form: SignInForm) -> Self {
        Credentials::new(form.email, form.password)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for SignUpForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Field::new("name", &self.name)
            .required("Name required")
            .report(&mut errors);
        Field::new("email", &self.email)
            .required("E-mail required")
            .email("Insert valid e-mail")
            .report(&mut errors);
        Field::new("password", &self.password)
            .min_len(MIN_PASSWORD, "Password must be at least 6 characters")
            .report(&mut errors);

        errors.into_result()
    }
}

impl From<SignUpForm> for NewUser {
    fn from(form: SignUpForm) -> Self {
        NewUser {
            name: form.name,
            email: form.email,
            password: form.password,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Field::new("email", &self.email)
            .required("Insert valid e-mail")
            .email("Insert valid e-mail")
            .report(&mut errors);

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirmation: String,
}

impl ResetPasswordForm {
    pub fn into_request(self, token: String) -> ResetPassword {
        ResetPassword {
            token,
            password: self.password,
            password_confirmation: self.password_confirmation,
        }
    }
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Field::new("password", &self.password)
            .required("Insert password")
            .report(&mut errors);
        Field::new("password_confirmation", &self.password_confirmation)
            .equals(&self.password, "Confirmation doesn't match")
            .report(&mut errors);

        errors.into_result()
    }
}

/// Pull the reset token out of a `?token=...` query string.
pub fn reset_token_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

impl ProfileForm {
    fn changes_password(&self) -> bool {
        !self.old_password.is_empty()
    }
}

impl Validate for ProfileForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        Field::new("name", &self.name)
            .required("Name required")
            .report(&mut errors);
        Field::new("email", &self.email)
            .required("Insert valid e-mail")
            .email("Insert valid e-mail")
            .report(&mut errors);

        let mut password = Field::new("password", &self.password);
        let mut confirmation = Field::new("password_confirmation", &self.password_confirmation);
        if self.changes_password() {
            password = password
                .required("At least 6 characters")
                .min_len(MIN_PASSWORD, "At least 6 characters");
            confirmation = confirmation
                .required("At least 6 characters")
                .min_len(MIN_PASSWORD, "At least 6 characters");
        }
        password.report(&mut errors);
        confirmation
            .equals(&self.password, "Passwords don't match")
            .report(&mut errors);

        errors.into_result()
    }
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        let password_change = form.changes_password().then(|| PasswordChange {
            old_password: form.old_password,
            password: form.password,
            password_confirmation: form.password_confirmation,
        });

        ProfileUpdate {
            name: form.name,
            email: form.email,
            password_change,
        }
    }
}
