//! Account movements for a card

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::api;
use super::error::{FetchError, PortalError};
use super::transport::{PortalRequest, Transport};
use crate::core::{Session, Transaction};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementData {
    movement_list: Vec<Movement>,
}

/// One record of `movementList`
///
/// Mapped fields are taken as the portal sends them; a record with an odd
/// date or amount is still exported.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Movement {
    #[serde(default)]
    transaction_date: Value,
    #[serde(default)]
    transaction_name: Value,
    #[serde(default)]
    amount: Value,

    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<Movement> for Transaction {
    fn from(movement: Movement) -> Self {
        let mut extra = movement.rest;
        // Mapped names win over portal fields that happen to share them
        for key in ["date", "description", "amount"] {
            extra.remove(key);
        }

        let description = match movement.transaction_name {
            Value::Null => Value::String(String::new()),
            other => other,
        };

        Transaction {
            date: movement.transaction_date,
            description,
            amount: movement.amount,
            extra,
        }
    }
}

/// Fetch the movement list of `card_id`
///
/// The portal answers with one list; there is no paging.
pub async fn fetch_movements(
    transport: &dyn Transport,
    endpoint: &Url,
    session: &Session,
    card_id: &str,
) -> Result<Vec<Transaction>, FetchError> {
    let request = PortalRequest::get(api::protected_url(
        endpoint,
        &["card", card_id, "accountmovement"],
    ))
    .headers(session.auth_headers());

    let response = api::send(transport, request)
        .await
        .map_err(FetchError::Transport)?;

    let data: MovementData = api::decode_data(&response).map_err(|e| match e {
        PortalError::Malformed(reason) => FetchError::MalformedResponse(reason),
        other => FetchError::Transport(other),
    })?;

    let transactions: Vec<Transaction> = data.movement_list.into_iter().map(Into::into).collect();
    tracing::info!("Fetched {} transactions for card {}", transactions.len(), card_id);
    Ok(transactions)
}
