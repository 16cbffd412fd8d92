//! Login credentials supplied by the caller

use std::fmt;

use super::redactor::PersonalInfoRedactor;

/// Email/password pair used to log in to the portal
///
/// `endpoint`, when set, replaces the client's portal endpoint for every
/// call made after the login that carried it.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub endpoint: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            endpoint: None,
        }
    }

    /// Builder pattern: override the portal endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Both email and password carry something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "email",
                &PersonalInfoRedactor::partial_redact_email(Some(&self.email)),
            )
            .field("password", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
