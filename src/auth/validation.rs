//! Client-side checks for the sign-up and login forms, and the mapping of
//! provider failures onto form fields.

use crate::auth::error::AuthError;
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_EMAIL_DOMAIN: &str = "@nitsri.ac.in";
pub const MIN_PASSWORD_LEN: usize = 6;
pub const LOGIN_FAILED: &str = "Failed to sign in. Please check your email and password.";

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Per-field messages shown under the sign-up inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub form: Option<String>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.form.is_none()
    }

    /// Maps a provider failure to the field it concerns.
    #[must_use]
    pub fn from_sign_up_error(error: &AuthError) -> Self {
        let mut errors = Self::default();
        match error {
            AuthError::AccountExists => {
                errors.email = Some("That email address is already in use.".to_string());
            }
            AuthError::InvalidEmail => {
                errors.email = Some("That email address is invalid.".to_string());
            }
            AuthError::WeakPassword => {
                errors.password = Some(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters long."
                ));
            }
            AuthError::InvalidCredentials | AuthError::Network(_) => {
                errors.form = Some("An error occurred. Please try again.".to_string());
            }
        }
        errors
    }
}

/// Checks the sign-up form; every field is reported, not just the first failure.
#[must_use]
pub fn validate_sign_up(name: &str, email: &str, password: &str, domain: &str) -> FormErrors {
    let mut errors = FormErrors::default();

    if name.trim().is_empty() {
        errors.name = Some("Please enter your full name.".to_string());
    }

    let email = email.trim();
    if email.is_empty() {
        errors.email = Some("Please enter your email address.".to_string());
    } else if !email.to_lowercase().ends_with(&domain.to_lowercase()) {
        errors.email = Some(format!(
            "Only {} email addresses are allowed.",
            domain_label(domain)
        ));
    }

    if password.is_empty() {
        errors.password = Some("Please create a password.".to_string());
    }

    errors
}

// "@nitsri.ac.in" -> "NITSRI"
fn domain_label(domain: &str) -> String {
    domain
        .trim_start_matches('@')
        .split('.')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
