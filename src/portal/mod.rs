//! Edenred customer portal client
//!
//! A [`PortalClient`] owns at most one [`Session`]. Login replaces it
//! atomically on success and leaves it untouched on failure; card and
//! movement lookups refuse to run without one.

pub mod api;
mod auth;
mod cards;
mod error;
mod movements;
mod prompt;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use url::Url;

use crate::core::{Card, Credentials, Session, Transaction};

pub use auth::{AuthFlow, Authenticator};
pub use error::{AuthError, FetchError, InvalidEndpoint, PortalError, ResolutionError};
pub use prompt::{CodePrompt, FixedCode, TerminalPrompt};
pub use transport::{
    HttpTransport, Method, PortalRequest, PortalResponse, Transport, TransportError,
};

pub struct PortalClient {
    transport: Arc<dyn Transport>,
    endpoint: Url,
    authenticator: Authenticator,
    session: Option<Session>,
}

impl PortalClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: &str,
        authenticator: Authenticator,
    ) -> Result<Self, InvalidEndpoint> {
        Ok(Self {
            transport,
            endpoint: api::parse_endpoint(endpoint)?,
            authenticator,
            session: None,
        })
    }

    /// Endpoint every login and protected call goes to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Log in and keep the resulting session
    ///
    /// An endpoint carried by `credentials` replaces the client endpoint for
    /// this and every later call, even if the login itself fails. Card and
    /// movement lookups follow the client endpoint, not the one the session
    /// was issued on.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, AuthError> {
        if !credentials.is_complete() {
            return Err(AuthError::MissingCredentials);
        }
        if let Some(endpoint) = &credentials.endpoint {
            self.endpoint = api::parse_endpoint(endpoint)?;
            tracing::debug!("Using portal endpoint {}", self.endpoint);
        }

        let session = self
            .authenticator
            .login(self.transport.as_ref(), &self.endpoint, credentials)
            .await?;

        if self.session.is_some() {
            tracing::debug!("Replacing existing session");
        }
        Ok(self.session.insert(session))
    }

    /// All cards on the account
    pub async fn cards(&self) -> Result<Vec<Card>, ResolutionError> {
        let session = self.session.as_ref().ok_or(ResolutionError::LoginRequired)?;
        cards::list_cards(self.transport.as_ref(), &self.endpoint, session).await
    }

    /// Identifier of the first card on the account
    pub async fn card_id(&self) -> Result<String, ResolutionError> {
        let session = self.session.as_ref().ok_or(ResolutionError::LoginRequired)?;
        cards::first_card_id(self.transport.as_ref(), &self.endpoint, session).await
    }

    /// Movements of `card_id`, or of the first card when `None`
    pub async fn transactions(&self, card_id: Option<&str>) -> Result<Vec<Transaction>, FetchError> {
        let session = self.session.as_ref().ok_or(FetchError::LoginRequired)?;

        let card_id = match card_id {
            Some(id) => id.to_string(),
            None => {
                cards::first_card_id(self.transport.as_ref(), &self.endpoint, session).await?
            }
        };

        movements::fetch_movements(self.transport.as_ref(), &self.endpoint, session, &card_id)
            .await
    }
}
