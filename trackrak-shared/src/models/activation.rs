use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Marker the activation service puts in `data.status` when the user has no
/// linkable payment card.
const NO_CARD_MARKER: &str = "no-card";

/// Outcome of a single activation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivationResult {
    /// False only when the request never produced an HTTP response
    pub accepted: bool,
    pub status_code: Option<u16>,
    /// Parsed response body; `None` when the body was not valid JSON
    pub body: Option<Value>,
    pub error: Option<String>,
}

impl ActivationResult {
    pub fn responded(status_code: u16, body: Option<Value>) -> Self {
        Self {
            accepted: true,
            status_code: Some(status_code),
            body,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            accepted: false,
            status_code: None,
            body: None,
            error: Some(error.into()),
        }
    }

    /// The `data.status` value when it signals that no card is linked
    pub fn no_card_status(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.pointer("/data/status"))
            .and_then(Value::as_str)
            .filter(|status| status.to_lowercase().contains(NO_CARD_MARKER))
    }
}

/// Progress snapshot delivered after each activated offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationProgress {
    pub done: usize,
    pub total: usize,
    pub current_offer_name: String,
}

impl ActivationProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }
}

/// Aggregate result of one orchestrated activation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivationRun {
    pub run_id: Uuid,
    pub done: usize,
    pub total: usize,
    pub no_cards: bool,
    /// Body of the response that carried the no-card signal
    pub first_response_body: Option<Value>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ActivationRun {
    pub fn new(total: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            done: 0,
            total,
            no_cards: false,
            first_response_body: None,
            finished_at: None,
        }
    }
}
