use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Offer identifier as delivered by the feed (either a string or a number)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum OfferId {
    Number(i64),
    Text(String),
}

impl OfferId {
    /// Integer form expected by the activation service
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OfferId::Number(n) => Some(*n),
            OfferId::Text(s) => s.trim().parse().ok(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(OfferId::Number),
            Value::String(s) if !s.is_empty() => Some(OfferId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferId::Number(n) => write!(f, "{}", n),
            OfferId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Offer status as reported by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Available,
    Activated,
    Other(String),
}

impl OfferStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("available") => OfferStatus::Available,
            Some("activated") => OfferStatus::Activated,
            Some(other) => OfferStatus::Other(other.to_string()),
            None => OfferStatus::Other(String::new()),
        }
    }
}

/// A single in-store cashback offer from the catalog feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub merchant_name: String,
    pub offer_status: OfferStatus,
    pub raw: Value,
}

impl Offer {
    /// Build an offer from a feed `itemData` record.
    ///
    /// Never fails: a missing id becomes an empty text id (which has no
    /// integer form and is therefore never sent for activation).
    pub fn from_item_data(raw: Value) -> Self {
        let id = raw
            .get("id")
            .and_then(OfferId::from_value)
            .unwrap_or_else(|| OfferId::Text(String::new()));

        let merchant_name = ["merchantname_text", "merchantname"]
            .iter()
            .filter_map(|key| raw.get(*key).and_then(Value::as_str))
            .find(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("offer-{}", id));

        let offer_status = OfferStatus::parse(raw.get("offer_status").and_then(Value::as_str));

        Self {
            id,
            merchant_name,
            offer_status,
            raw,
        }
    }

    pub fn is_available(&self) -> bool {
        self.offer_status == OfferStatus::Available
    }
}

/// Pagination cursor for the catalog feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageCursor {
    pub token: String,
    pub has_next_page: bool,
}

impl PageCursor {
    /// Cursor for the very first page request
    pub fn start() -> Self {
        Self {
            token: String::new(),
            has_next_page: true,
        }
    }

    /// Cursor returned when the feed carries no page info
    pub fn terminal() -> Self {
        Self {
            token: String::new(),
            has_next_page: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offer_from_item_data() {
        let offer = Offer::from_item_data(json!({
            "id": "12345",
            "merchantname_text": "Target",
            "merchantname": "target",
            "offer_status": "available",
        }));

        assert_eq!(offer.id, OfferId::Text("12345".to_string()));
        assert_eq!(offer.id.as_int(), Some(12345));
        assert_eq!(offer.merchant_name, "Target");
        assert!(offer.is_available());
    }

    #[test]
    fn test_merchant_name_fallbacks() {
        let offer = Offer::from_item_data(json!({ "id": 77, "merchantname": "Best Buy" }));
        assert_eq!(offer.merchant_name, "Best Buy");
        assert_eq!(offer.offer_status, OfferStatus::Other(String::new()));

        let offer = Offer::from_item_data(json!({ "id": 78, "offer_status": "activated" }));
        assert_eq!(offer.merchant_name, "offer-78");
        assert_eq!(offer.offer_status, OfferStatus::Activated);
    }

    #[test]
    fn test_missing_id_has_no_integer_form() {
        let offer = Offer::from_item_data(json!({ "merchantname": "Nameless" }));
        assert_eq!(offer.id.as_int(), None);
    }
}
