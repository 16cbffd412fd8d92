//! Portal endpoints and the `{ "data": ... }` response envelope

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::error::{InvalidEndpoint, PortalError};
use super::transport::{PortalRequest, PortalResponse, Transport};

/// Customer portal used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://empleados.edenred.es";

const API_PREFIX: [&str; 2] = ["edenred-customer", "api"];

/// Fixed query parameters the portal expects on every call
const APP_QUERY: [(&str, &str); 3] = [
    ("appVersion", "1.0"),
    ("appType", "PORTAL"),
    ("channel", "WEB"),
];

pub const AUTHENTICATE_PATH: [&str; 2] = ["authenticate", "default"];
pub const CHALLENGE_PATH: [&str; 2] = ["authenticate", "challenge"];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Parse a portal endpoint, which must be an http(s) base URL
pub fn parse_endpoint(raw: &str) -> Result<Url, InvalidEndpoint> {
    let invalid = |reason: String| InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    Ok(url)
}

/// Build `{endpoint}/edenred-customer/api/{segments..}?appVersion=1.0&appType=PORTAL&channel=WEB`
pub fn portal_url(endpoint: &Url, segments: &[&str]) -> Url {
    let mut url = endpoint.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(API_PREFIX.iter().chain(segments));
    }
    url.query_pairs_mut().clear().extend_pairs(APP_QUERY);
    url.set_fragment(None);
    url
}

/// URL of a protected resource below `protected/`
pub fn protected_url(endpoint: &Url, segments: &[&str]) -> Url {
    let mut full = Vec::with_capacity(segments.len() + 1);
    full.push("protected");
    full.extend_from_slice(segments);
    portal_url(endpoint, &full)
}

/// Send a request and reject non-2xx answers
pub async fn send(
    transport: &dyn Transport,
    request: PortalRequest,
) -> Result<PortalResponse, PortalError> {
    tracing::debug!(method = ?request.method, path = request.url.path(), "Portal request");

    let response = transport.send(request).await?;

    if !response.is_success() {
        tracing::debug!(status = response.status, "Portal request rejected");
        return Err(PortalError::Status {
            status: response.status,
            body: response.body.chars().take(200).collect(),
        });
    }

    Ok(response)
}

/// Decode the `data` member of the response envelope
pub fn decode_data<T: DeserializeOwned>(response: &PortalResponse) -> Result<T, PortalError> {
    serde_json::from_str::<Envelope<T>>(&response.body)
        .map(|envelope| envelope.data)
        .map_err(|e| PortalError::Malformed(e.to_string()))
}
