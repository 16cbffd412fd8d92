//! Portal error types
//!
//! Every portal operation has its own error enum; the shared [`PortalError`]
//! describes what went wrong on the wire and is attached as the source.

use thiserror::Error;

use super::transport::TransportError;

/// Failure talking to the portal or understanding its answer
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Portal returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected portal response: {0}")]
    Malformed(String),
}

/// The configured portal endpoint is not a usable base URL
#[derive(Debug, Error)]
#[error("Invalid portal endpoint '{endpoint}': {reason}")]
pub struct InvalidEndpoint {
    pub endpoint: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error(transparent)]
    InvalidEndpoint(#[from] InvalidEndpoint),

    #[error("Login failed")]
    LoginFailed(#[source] PortalError),

    #[error("An authentication code is required to complete the login challenge")]
    CodeRequired,

    #[error("Login challenge failed")]
    ChallengeFailed(#[source] PortalError),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Login required before looking up cards")]
    LoginRequired,

    #[error("No card found: {0}")]
    NotFound(String),

    #[error("Failed to retrieve card list")]
    Transport(#[source] PortalError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Login required before fetching transactions")]
    LoginRequired,

    #[error("Failed to resolve card")]
    CardResolution(#[from] ResolutionError),

    #[error("Failed to retrieve transactions")]
    Transport(#[source] PortalError),

    #[error("Movement list missing from portal response: {0}")]
    MalformedResponse(String),
}
