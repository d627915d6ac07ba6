pub mod client;
pub mod feed;

pub use client::{filter_available, CatalogClient};
pub use feed::{parse_page, CatalogError, CatalogFeed, HttpCatalogFeed};
