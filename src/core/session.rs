//! Authenticated portal session

use std::fmt;

use url::Url;

/// How the session token is presented in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScheme {
    /// Token sent as-is, alongside the session cookie
    Raw,
    /// `Bearer <token>`
    Bearer,
}

/// Credentials the portal handed out after a successful login
///
/// A session is only ever built complete; there is no partially
/// authenticated state.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub endpoint: Url,
    pub token: String,
    pub cookie: Option<String>,
    pub scheme: TokenScheme,
}

impl Session {
    pub fn new(endpoint: Url, token: impl Into<String>, scheme: TokenScheme) -> Self {
        Self {
            endpoint,
            token: token.into(),
            cookie: None,
            scheme,
        }
    }

    /// Builder pattern: attach the session cookie
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Headers that must accompany every protected request
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        let authorization = match self.scheme {
            TokenScheme::Raw => self.token.clone(),
            TokenScheme::Bearer => format!("Bearer {}", self.token),
        };

        let mut headers = vec![("Authorization".to_string(), authorization)];
        if let Some(cookie) = &self.cookie {
            headers.push(("Cookie".to_string(), cookie.clone()));
        }
        headers
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"[REDACTED]")
            .field("cookie", &self.cookie.as_ref().map(|_| "[REDACTED]"))
            .field("scheme", &self.scheme)
            .finish()
    }
}
