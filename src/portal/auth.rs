//! Portal login
//!
//! Three flows share one entry point:
//! - `cookie`: token plus the session cookie from `Set-Cookie`, token sent raw
//! - `token`: bearer token only
//! - `two-factor`: the first call yields a challenge id; the emailed code is
//!   exchanged for the bearer token on the challenge endpoint

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use super::api::{self, AUTHENTICATE_PATH, CHALLENGE_PATH};
use super::error::{AuthError, PortalError};
use super::prompt::CodePrompt;
use super::transport::{PortalRequest, PortalResponse, Transport};
use crate::core::{Credentials, PersonalInfoRedactor, Session, TokenScheme};

/// Which login exchange the portal expects
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AuthFlow {
    Cookie,
    Token,
    #[default]
    TwoFactor,
}

impl fmt::Display for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthFlow::Cookie => "cookie",
            AuthFlow::Token => "token",
            AuthFlow::TwoFactor => "two-factor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateData {
    token: Option<String>,
    challenge_id: Option<Value>,
}

impl AuthenticateData {
    fn token(self) -> Result<String, PortalError> {
        self.token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PortalError::Malformed("response carries no session token".to_string()))
    }

    fn challenge_id(&self) -> Result<String, PortalError> {
        match &self.challenge_id {
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(PortalError::Malformed(
                "response carries no challenge id".to_string(),
            )),
        }
    }
}

/// Transient two-factor challenge state
struct Challenge {
    challenge_id: String,
    auth_code: String,
}

/// Logs in with the configured [`AuthFlow`]
pub struct Authenticator {
    flow: AuthFlow,
    prompt: Option<Arc<dyn CodePrompt>>,
}

impl Authenticator {
    pub fn new(flow: AuthFlow) -> Self {
        Self { flow, prompt: None }
    }

    /// Builder pattern: where the two-factor code comes from
    pub fn with_prompt(mut self, prompt: Arc<dyn CodePrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn flow(&self) -> AuthFlow {
        self.flow
    }

    /// Run the login exchange against `endpoint`
    ///
    /// Performs no request at all when email or password is blank.
    pub async fn login(
        &self,
        transport: &dyn Transport,
        endpoint: &Url,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        if !credentials.is_complete() {
            return Err(AuthError::MissingCredentials);
        }

        let email = credentials.email.trim();
        tracing::info!(
            "Logging in as {} ({} flow)",
            PersonalInfoRedactor::partial_redact_email(Some(email)),
            self.flow
        );

        let request = PortalRequest::post(
            api::portal_url(endpoint, &AUTHENTICATE_PATH),
            json!({
                "userId": email,
                "password": credentials.password,
            }),
        )
        .header("Content-Type", "application/json");

        let response = api::send(transport, request)
            .await
            .map_err(AuthError::LoginFailed)?;
        let data: AuthenticateData =
            api::decode_data(&response).map_err(AuthError::LoginFailed)?;

        let session = match self.flow {
            AuthFlow::Cookie => {
                let cookie = session_cookie(&response).ok_or_else(|| {
                    AuthError::LoginFailed(PortalError::Malformed(
                        "response carries no session cookie".to_string(),
                    ))
                })?;
                let token = data.token().map_err(AuthError::LoginFailed)?;
                Session::new(endpoint.clone(), token, TokenScheme::Raw).with_cookie(cookie)
            }
            AuthFlow::Token => {
                let token = data.token().map_err(AuthError::LoginFailed)?;
                Session::new(endpoint.clone(), token, TokenScheme::Bearer)
            }
            AuthFlow::TwoFactor => {
                let challenge_id = data.challenge_id().map_err(AuthError::LoginFailed)?;
                tracing::info!("Portal requested a two-factor challenge");
                let challenge = Challenge {
                    challenge_id,
                    auth_code: self.request_code(email).await?,
                };
                let token = self
                    .answer_challenge(transport, endpoint, credentials, challenge)
                    .await?;
                Session::new(endpoint.clone(), token, TokenScheme::Bearer)
            }
        };

        tracing::info!("Login succeeded");
        Ok(session)
    }

    async fn request_code(&self, email: &str) -> Result<String, AuthError> {
        let prompt = self.prompt.as_ref().ok_or(AuthError::CodeRequired)?;
        let code = prompt
            .request_code(email)
            .await
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .ok_or(AuthError::CodeRequired)?;
        Ok(code)
    }

    /// Exchange the challenge for a session token, authenticating with the code itself
    async fn answer_challenge(
        &self,
        transport: &dyn Transport,
        endpoint: &Url,
        credentials: &Credentials,
        challenge: Challenge,
    ) -> Result<String, AuthError> {
        let request = PortalRequest::post(
            api::portal_url(endpoint, &CHALLENGE_PATH),
            json!({
                "userId": credentials.email.trim(),
                "password": credentials.password,
                "challengeId": challenge.challenge_id,
                "authCode": challenge.auth_code,
            }),
        )
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", challenge.auth_code));

        let response = api::send(transport, request)
            .await
            .map_err(AuthError::ChallengeFailed)?;
        let data: AuthenticateData =
            api::decode_data(&response).map_err(AuthError::ChallengeFailed)?;
        data.token().map_err(AuthError::ChallengeFailed)
    }
}

/// `name=value` pairs of every `Set-Cookie` header, joined for a `Cookie` header
fn session_cookie(response: &PortalResponse) -> Option<String> {
    let pairs: Vec<&str> = response
        .set_cookies
        .iter()
        .filter_map(|c| c.split(';').next())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
