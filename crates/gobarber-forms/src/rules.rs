//! Field rules
//!
//! A field runs its rules in order and keeps the first failure.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationErrors;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub(crate) struct Field<'a> {
    name: &'a str,
    value: &'a str,
    error: Option<&'a str>,
}

impl<'a> Field<'a> {
    pub(crate) fn new(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            value,
            error: None,
        }
    }

    pub(crate) fn required(self, message: &'a str) -> Self {
        let failed = self.value.is_empty();
        self.check(failed, message)
    }

    /// Empty values pass; pair with `required` when the field is mandatory.
    pub(crate) fn email(self, message: &'a str) -> Self {
        let failed = !self.value.is_empty() && !EMAIL.is_match(self.value);
        self.check(failed, message)
    }

    pub(crate) fn min_len(self, min: usize, message: &'a str) -> Self {
        let failed = self.value.chars().count() < min;
        self.check(failed, message)
    }

    pub(crate) fn equals(self, other: &str, message: &'a str) -> Self {
        let failed = self.value != other;
        self.check(failed, message)
    }

    pub(crate) fn report(self, errors: &mut ValidationErrors) {
        if let Some(message) = self.error {
            errors.add(self.name, message);
        }
    }

    fn check(mut self, failed: bool, message: &'a str) -> Self {
        if self.error.is_none() && failed {
            self.error = Some(message);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(field: Field<'_>) -> Option<String> {
        let mut errors = ValidationErrors::new();
        let name = field.name.to_string();
        field.report(&mut errors);
        errors.get(&name).map(str::to_string)
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL.is_match("jane@example.com"));
        assert!(EMAIL.is_match("jane.doe+barber@mail.example.co"));
        assert!(!EMAIL.is_match("jane"));
        assert!(!EMAIL.is_match("jane@example"));
        assert!(!EMAIL.is_match("jane @example.com"));
    }

    #[test]
    fn test_first_failing_rule_is_kept() {
        let message = run(Field::new("email", "")
            .required("E-mail required")
            .email("Insert valid e-mail"));
        assert_eq!(message.as_deref(), Some("E-mail required"));

        let message = run(Field::new("email", "nope")
            .required("E-mail required")
            .email("Insert valid e-mail"));
        assert_eq!(message.as_deref(), Some("Insert valid e-mail"));
    }

    #[test]
    fn test_min_len_counts_characters() {
        assert!(run(Field::new("password", "ação12").min_len(6, "short")).is_none());
        assert_eq!(
            run(Field::new("password", "12345").min_len(6, "short")).as_deref(),
            Some("short")
        );
    }

    #[test]
    fn test_equals() {
        assert!(run(Field::new("c", "abc").equals("abc", "mismatch")).is_none());
        assert_eq!(
            run(Field::new("c", "").equals("abc", "mismatch")).as_deref(),
            Some("mismatch")
        );
    }
}
