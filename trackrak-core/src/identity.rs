use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use trackrak_shared::SessionIds;

use crate::{CoreError, CoreResult};

/// Where the in-store offers (and the activation flow) live
pub const ACTIVATION_PAGE_URL: &str = "https://rakuten.com/in-store";

/// Locations treated as the activation page
pub const ACTIVATION_PAGE_PREFIXES: [&str; 2] = [
    "https://rakuten.com/in-store",
    "https://www.rakuten.com/in-store",
];

/// Element id of the state blob the rewards site embeds in every page
pub const EMBEDDED_STATE_ID: &str = "__NEXT_DATA__";

static EMBEDDED_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\sid\s*=\s*["']?__NEXT_DATA__["']?[^>]*>(.*?)</script\s*>"#)
        .expect("embedded state pattern is valid")
});

/// Snapshot of the host page at the time the flow inspects it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Extracts the session identifiers from the page's embedded state and
/// knows which locations host the activation flow.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    allowed_prefixes: Vec<String>,
}

impl IdentityResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self { allowed_prefixes }
    }

    /// Best-effort lookup: any parse or path failure yields empty ids.
    pub fn resolve_identifiers(&self, page: &PageSnapshot) -> SessionIds {
        match extract_identifiers(&page.html) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(url = %page.url, "Session identifiers unavailable: {}", e);
                SessionIds::empty()
            }
        }
    }

    pub fn is_activation_page(&self, url: &str) -> bool {
        self.allowed_prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(ACTIVATION_PAGE_PREFIXES.iter().map(|p| p.to_string()).collect())
    }
}

fn extract_identifiers(html: &str) -> CoreResult<SessionIds> {
    let blob = EMBEDDED_STATE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|blob| !blob.is_empty())
        .ok_or_else(|| CoreError::IdentityError(format!("no #{} element", EMBEDDED_STATE_ID)))?;

    let state: Value = serde_json::from_str(blob)
        .map_err(|e| CoreError::IdentityError(format!("malformed embedded state: {}", e)))?;

    let app_state = state
        .pointer("/props/appState")
        .ok_or_else(|| CoreError::IdentityError("props.appState missing".to_string()))?;

    let read = |key: &str| {
        app_state
            .get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Ok(SessionIds {
        euid: read("euid"),
        eutid: read("eutid"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_state(state: &str) -> PageSnapshot {
        PageSnapshot::new(
            "https://www.rakuten.com/in-store",
            format!(
                r#"<html><head></head><body><div id="app"></div>
<script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
                state
            ),
        )
    }

    #[test]
    fn test_resolves_both_identifiers() {
        let page = page_with_state(r#"{"props":{"appState":{"euid":"eb-123","eutid":"guid-456"}}}"#);
        let ids = IdentityResolver::default().resolve_identifiers(&page);

        assert_eq!(ids, SessionIds::new("eb-123", "guid-456"));
        assert!(ids.is_complete());
    }

    #[test]
    fn test_missing_blob_yields_empty_ids() {
        let page = PageSnapshot::new("https://www.rakuten.com/in-store", "<html><body>signed out</body></html>");
        let ids = IdentityResolver::default().resolve_identifiers(&page);

        assert_eq!(ids, SessionIds::empty());
    }

    #[test]
    fn test_malformed_blob_yields_empty_ids() {
        let page = page_with_state(r#"{"props":{"appState":"#);
        assert_eq!(IdentityResolver::default().resolve_identifiers(&page), SessionIds::empty());
    }

    #[test]
    fn test_partial_and_empty_identifiers() {
        let page = page_with_state(r#"{"props":{"appState":{"euid":"eb-123","eutid":""}}}"#);
        let ids = IdentityResolver::default().resolve_identifiers(&page);

        assert_eq!(ids.euid.as_deref(), Some("eb-123"));
        assert_eq!(ids.eutid, None);
        assert!(!ids.is_complete());
    }

    #[test]
    fn test_prefixed_id_attribute_is_not_the_state_blob() {
        let decoy = r#"<script data-id="__NEXT_DATA__">{"props":{"appState":{"euid":"fake","eutid":"fake"}}}</script>"#;
        let page = PageSnapshot::new("https://www.rakuten.com/in-store", decoy);
        assert_eq!(IdentityResolver::default().resolve_identifiers(&page), SessionIds::empty());

        let page = PageSnapshot::new(
            "https://www.rakuten.com/in-store",
            format!(
                r#"{}<script type="application/json" id="__NEXT_DATA__">{}</script>"#,
                decoy, r#"{"props":{"appState":{"euid":"eb-1","eutid":"guid-1"}}}"#
            ),
        );
        assert_eq!(
            IdentityResolver::default().resolve_identifiers(&page),
            SessionIds::new("eb-1", "guid-1")
        );
    }

    #[test]
    fn test_activation_page_prefixes() {
        let resolver = IdentityResolver::default();
        assert!(resolver.is_activation_page("https://www.rakuten.com/in-store?tab=all"));
        assert!(resolver.is_activation_page("https://rakuten.com/in-store"));
        assert!(!resolver.is_activation_page("https://www.rakuten.com/stores"));
        assert!(!resolver.is_activation_page("https://example.com/https://rakuten.com/in-store"));
    }
}
