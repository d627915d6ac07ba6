use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use trackrak_shared::{Offer, PageCursor};

use crate::feed::{parse_page, CatalogFeed};

/// Walks the paginated offer feed and materialises the full list
pub struct CatalogClient {
    feed: Arc<dyn CatalogFeed>,
    page_delay: Duration,
    max_pages: usize,
}

impl CatalogClient {
    pub fn new(feed: Arc<dyn CatalogFeed>) -> Self {
        Self {
            feed,
            page_delay: Duration::from_millis(200),
            max_pages: 500,
        }
    }

    /// Pause between page requests, to stay under the feed's rate limit
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetch every page until the feed reports no next page.
    ///
    /// A failed page ends pagination; whatever was collected before it is
    /// returned rather than an error.
    pub async fn fetch_all_offers(&self) -> Vec<Offer> {
        let mut offers = Vec::new();
        let mut cursor = PageCursor::start();
        let mut page_number = 0usize;

        while cursor.has_next_page {
            if page_number >= self.max_pages {
                tracing::warn!(
                    pages = page_number,
                    offers = offers.len(),
                    "Catalog page limit reached, returning collected offers"
                );
                break;
            }

            let span = tracing::debug_span!("catalog_page", page = page_number);
            let page = match self.feed.fetch_page(&cursor).instrument(span).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        page = page_number,
                        collected = offers.len(),
                        "Error fetching in-store offers: {}",
                        e
                    );
                    break;
                }
            };

            let (items, next) = parse_page(&page);
            tracing::debug!(page = page_number, items = items.len(), has_next = next.has_next_page, "Catalog page parsed");
            offers.extend(items);
            cursor = next;
            page_number += 1;

            if cursor.has_next_page && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        tracing::info!(pages = page_number, offers = offers.len(), "Catalog fetch finished");
        offers
    }
}

/// Offers that still need activating
pub fn filter_available(offers: Vec<Offer>) -> Vec<Offer> {
    offers.into_iter().filter(Offer::is_available).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_available() {
        let offers = vec![
            Offer::from_item_data(json!({ "id": 1, "offer_status": "available" })),
            Offer::from_item_data(json!({ "id": 2, "offer_status": "activated" })),
            Offer::from_item_data(json!({ "id": 3, "offer_status": "expired" })),
            Offer::from_item_data(json!({ "id": 4, "offer_status": "available" })),
        ];

        let available = filter_available(offers);
        let ids: Vec<_> = available.iter().filter_map(|o| o.id.as_int()).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
