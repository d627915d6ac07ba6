use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use trackrak_shared::{ActivationResult, Masked, Offer};

#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("Offer {0} has no integer id")]
    InvalidOfferId(String),

    #[error("Activation payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Activation request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Links all of the user's cards to a single offer
#[async_trait]
pub trait OfferActivator: Send + Sync {
    async fn activate(
        &self,
        offer: &Offer,
        session_token: &Masked<String>,
        user_identifier: &str,
    ) -> ActivationResult;
}

/// Attribution sent with every activation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingTicket {
    pub source_name: String,
    pub source_id: u64,
}

impl Default for TrackingTicket {
    fn default() -> Self {
        Self {
            source_name: "Web-Desktop".to_string(),
            source_id: 6991168,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivationRequest<'a> {
    #[serde(rename = "userGUID")]
    user_guid: &'a str,
    offer_ids: [i64; 1],
    tracking_ticket: &'a TrackingTicket,
}

/// Build the JSON body for one offer.
pub fn activation_payload(
    offer: &Offer,
    user_identifier: &str,
    ticket: &TrackingTicket,
) -> Result<Value, ActivationError> {
    let offer_id = offer
        .id
        .as_int()
        .ok_or_else(|| ActivationError::InvalidOfferId(offer.id.to_string()))?;

    let request = ActivationRequest {
        user_guid: user_identifier,
        offer_ids: [offer_id],
        tracking_ticket: ticket,
    };
    Ok(serde_json::to_value(request)?)
}

/// Interpret a response that made it over the wire: unparsable JSON is
/// "no body", not a failure.
pub fn interpret_body(status: u16, bytes: &[u8]) -> ActivationResult {
    ActivationResult::responded(status, serde_json::from_slice(bytes).ok())
}

/// HTTP client for the card-linking service
pub struct HttpActivationClient {
    client: reqwest::Client,
    url: String,
    ticket: TrackingTicket,
}

impl HttpActivationClient {
    pub fn new(url: String, ticket: TrackingTicket) -> Self {
        Self::with_client(reqwest::Client::new(), url, ticket)
    }

    pub fn with_client(client: reqwest::Client, url: String, ticket: TrackingTicket) -> Self {
        Self { client, url, ticket }
    }

    async fn send(
        &self,
        offer: &Offer,
        session_token: &Masked<String>,
        user_identifier: &str,
    ) -> Result<ActivationResult, ActivationError> {
        let payload = activation_payload(offer, user_identifier, &self.ticket)?;

        let response = self
            .client
            .post(&self.url)
            .header("Ebtoken", session_token.expose().as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok(interpret_body(status, &bytes))
    }
}

#[async_trait]
impl OfferActivator for HttpActivationClient {
    async fn activate(
        &self,
        offer: &Offer,
        session_token: &Masked<String>,
        user_identifier: &str,
    ) -> ActivationResult {
        match self.send(offer, session_token, user_identifier).await {
            Ok(result) => result,
            Err(e @ ActivationError::InvalidOfferId(_)) => {
                tracing::warn!(merchant = %offer.merchant_name, "Skipping activation: {}", e);
                ActivationResult::failed(e.to_string())
            }
            Err(e) => {
                tracing::error!(offer_id = %offer.id, "activateOffer error: {}", e);
                ActivationResult::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let offer = Offer::from_item_data(json!({ "id": "98765", "merchantname_text": "Target" }));
        let payload = activation_payload(&offer, "guid-1", &TrackingTicket::default()).unwrap();

        assert_eq!(
            payload,
            json!({
                "userGUID": "guid-1",
                "offerIds": [98765],
                "trackingTicket": { "sourceName": "Web-Desktop", "sourceId": 6991168 }
            })
        );
    }

    #[test]
    fn test_payload_rejects_non_integer_id() {
        let offer = Offer::from_item_data(json!({ "id": "abc" }));
        assert!(matches!(
            activation_payload(&offer, "guid-1", &TrackingTicket::default()),
            Err(ActivationError::InvalidOfferId(_))
        ));
    }

    #[test]
    fn test_unparsable_body_is_accepted_without_body() {
        let result = interpret_body(200, b"<html>ok</html>");
        assert!(result.accepted);
        assert_eq!(result.status_code, Some(200));
        assert!(result.body.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_json_body_is_kept() {
        let result = interpret_body(200, br#"{"data":{"status":"Success"}}"#);
        assert!(result.accepted);
        assert_eq!(result.body, Some(json!({ "data": { "status": "Success" } })));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_accepted() {
        let client = HttpActivationClient::new("http://127.0.0.1:9/link".to_string(), TrackingTicket::default());
        let offer = Offer::from_item_data(json!({ "id": 1 }));

        let result = client.activate(&offer, &Masked::from("eb"), "guid").await;
        assert!(!result.accepted);
        assert!(result.error.is_some());
    }
}
