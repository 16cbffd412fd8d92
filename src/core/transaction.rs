//! Card and transaction models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single card movement
///
/// `date` and `amount` hold whatever the portal sent, usually a date string
/// and a number. `extra` carries every field of the movement record that is
/// not mapped onto `date`, `description` or `amount`, in the order received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub amount: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(
        date: impl Into<Value>,
        description: impl Into<Value>,
        amount: impl Into<Value>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            extra: Map::new(),
        }
    }

    /// Builder pattern: add a passthrough field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A benefits card attached to the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(deserialize_with = "card_id")]
    pub id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The portal sends card ids as numbers on some accounts and strings on others
fn card_id<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected card id: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_field_order() {
        let tx = Transaction::new("2024-01-01", "Coffee", 3.5).with_field("currency", json!("EUR"));
        let value = serde_json::to_value(&tx).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["date", "description", "amount", "currency"]);
    }

    #[test]
    fn test_card_id_number_or_string() {
        let card: Card = serde_json::from_value(json!({"id": 4711, "alias": "Lunch"})).unwrap();
        assert_eq!(card.id, "4711");
        assert_eq!(card.extra.get("alias"), Some(&json!("Lunch")));

        let card: Card = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(card.id, "abc");

        assert!(serde_json::from_value::<Card>(json!({"id": null})).is_err());
    }
}
