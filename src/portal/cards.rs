//! Card lookup

use super::api;
use super::error::{PortalError, ResolutionError};
use super::transport::{PortalRequest, Transport};
use url::Url;

use crate::core::{Card, Session};

/// Fetch every card on the account, in portal order
pub async fn list_cards(
    transport: &dyn Transport,
    endpoint: &Url,
    session: &Session,
) -> Result<Vec<Card>, ResolutionError> {
    let request = PortalRequest::get(api::protected_url(endpoint, &["card", "list"]))
        .headers(session.auth_headers());

    let response = api::send(transport, request)
        .await
        .map_err(ResolutionError::Transport)?;

    api::decode_data(&response).map_err(|e| match e {
        PortalError::Malformed(reason) => ResolutionError::NotFound(reason),
        other => ResolutionError::Transport(other),
    })
}

/// Identifier of the first card on the account
///
/// Not cached; every call asks the portal again.
pub async fn first_card_id(
    transport: &dyn Transport,
    endpoint: &Url,
    session: &Session,
) -> Result<String, ResolutionError> {
    let card = list_cards(transport, endpoint, session)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ResolutionError::NotFound("card list is empty".to_string()))?;

    tracing::debug!("Resolved card {}", card.id);
    Ok(card.id)
}
