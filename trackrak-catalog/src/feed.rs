//! Catalog feed transport and page parsing.
//!
//! The feed is a GraphQL-shaped JSON document; offers live under
//! `data.viewer.topic.items.edges[].node.itemData` and the cursor under
//! `data.viewer.topic.items.pageInfo`.

use async_trait::async_trait;
use serde_json::Value;
use trackrak_shared::{Offer, PageCursor};

const ITEMS_POINTER: &str = "/data/viewer/topic/items";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed returned status {status}")]
    Status { status: u16 },

    #[error("Feed page could not be parsed: {0}")]
    Parse(String),
}

/// One page of the offer feed
#[async_trait]
pub trait CatalogFeed: Send + Sync {
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Value, CatalogError>;
}

/// HTTP transport for the in-store topic feed
pub struct HttpCatalogFeed {
    client: reqwest::Client,
    base_url: String,
    topic_id: u64,
    sort: String,
}

impl HttpCatalogFeed {
    pub fn new(base_url: String, topic_id: u64, sort: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, topic_id, sort)
    }

    pub fn with_client(client: reqwest::Client, base_url: String, topic_id: u64, sort: String) -> Self {
        Self {
            client,
            base_url,
            topic_id,
            sort,
        }
    }
}

#[async_trait]
impl CatalogFeed for HttpCatalogFeed {
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Value, CatalogError> {
        let topic_id = self.topic_id.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("topicId", topic_id.as_str()),
                ("sort", self.sort.as_str()),
                ("cursor", cursor.token.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Platform", "DESKTOP_WEB")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Extract the offers and the next cursor from a feed page.
///
/// Edges without `itemData` are skipped; a page without `pageInfo` is the
/// last one.
pub fn parse_page(page: &Value) -> (Vec<Offer>, PageCursor) {
    let items = page.pointer(ITEMS_POINTER);

    let offers = items
        .and_then(|items| items.get("edges"))
        .and_then(Value::as_array)
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge.pointer("/node/itemData"))
                .filter(|data| !data.is_null())
                .map(|data| Offer::from_item_data(data.clone()))
                .collect()
        })
        .unwrap_or_default();

    let cursor = items
        .and_then(|items| items.get("pageInfo"))
        .map(|info| PageCursor {
            token: info
                .get("endCursor")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            has_next_page: info
                .get("hasNextPage")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
        .unwrap_or_else(PageCursor::terminal);

    (offers, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page_extracts_items_and_cursor() {
        let page = json!({
            "data": { "viewer": { "topic": { "items": {
                "edges": [
                    { "node": { "itemData": { "id": "1", "merchantname_text": "Target", "offer_status": "available" } } },
                    { "node": { "itemData": { "id": "2", "merchantname_text": "Macy's", "offer_status": "activated" } } },
                    { "node": {} },
                ],
                "pageInfo": { "hasNextPage": true, "endCursor": "YXJyYXk=" }
            } } } }
        });

        let (offers, cursor) = parse_page(&page);
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].merchant_name, "Target");
        assert_eq!(cursor.token, "YXJyYXk=");
        assert!(cursor.has_next_page);
    }

    #[test]
    fn test_parse_page_without_page_info_is_terminal() {
        let (offers, cursor) = parse_page(&json!({ "errors": [{ "message": "bad topic" }] }));
        assert!(offers.is_empty());
        assert_eq!(cursor, PageCursor::terminal());
    }
}
