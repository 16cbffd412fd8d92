//! Sources for the emailed two-factor authentication code

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input};

use crate::core::PersonalInfoRedactor;

/// Supplies the code the portal emailed during a login challenge
///
/// `None` (or a blank code) aborts the login with `AuthError::CodeRequired`.
#[async_trait]
pub trait CodePrompt: Send + Sync {
    async fn request_code(&self, email: &str) -> Option<String>;
}

/// Asks for the code on the terminal
pub struct TerminalPrompt;

#[async_trait]
impl CodePrompt for TerminalPrompt {
    async fn request_code(&self, email: &str) -> Option<String> {
        let prompt = format!(
            "Authentication code sent to {}",
            PersonalInfoRedactor::partial_redact_email(Some(email))
        );

        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(code)) => Some(code),
            Ok(Err(e)) => {
                tracing::warn!("Could not read authentication code: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Authentication code prompt aborted: {}", e);
                None
            }
        }
    }
}

/// A code known up front (command line, environment, tests)
pub struct FixedCode(String);

impl FixedCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

#[async_trait]
impl CodePrompt for FixedCode {
    async fn request_code(&self, _email: &str) -> Option<String> {
        Some(self.0.clone())
    }
}
