//! HTTP transport for the portal API
//!
//! The portal layer only talks to [`Transport`]; [`HttpTransport`] is the
//! `reqwest`-backed implementation used by the binary.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use serde_json::Value;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("edenred-export/", env!("CARGO_PKG_VERSION"));

/// Errors raised before the portal produced any HTTP response
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outgoing portal request
#[derive(Clone)]
pub struct PortalRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PortalRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: Method::Post,
            url,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Headers and bodies carry tokens and passwords, so only the target is printed.
impl fmt::Debug for PortalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalRequest")
            .field("method", &self.method)
            .field("path", &self.url.path())
            .finish_non_exhaustive()
    }
}

/// A raw portal response
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: u16,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl PortalResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            set_cookies: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can deliver a request to the portal
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, TransportError>;
}

/// `reqwest`-backed transport
///
/// Timeouts live here; the portal operations themselves never time out.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.url)
            .header("Accept", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response.text().await?;

        Ok(PortalResponse {
            status,
            set_cookies,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_debug_hides_headers_and_body() {
        let request = PortalRequest::post(
            Url::parse("https://portal.test/login").unwrap(),
            json!({"password": "hunter2"}),
        )
        .header("Authorization", "Bearer secret");

        let debug = format!("{:?}", request);
        assert!(debug.contains("/login"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_header_value_case_insensitive() {
        let request = PortalRequest::get(Url::parse("https://portal.test").unwrap())
            .header("Authorization", "tok");
        assert_eq!(request.header_value("authorization"), Some("tok"));
        assert_eq!(request.header_value("cookie"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(PortalResponse::new(200, "").is_success());
        assert!(PortalResponse::new(204, "").is_success());
        assert!(!PortalResponse::new(302, "").is_success());
        assert!(!PortalResponse::new(401, "").is_success());
    }
}
