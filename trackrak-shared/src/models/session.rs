use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session identifiers of the signed-in user on the rewards site
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionIds {
    pub euid: Option<String>,
    pub eutid: Option<String>,
}

impl SessionIds {
    pub fn new(euid: impl Into<String>, eutid: impl Into<String>) -> Self {
        Self {
            euid: Some(euid.into()),
            eutid: Some(eutid.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Both identifiers present and non-empty
    pub fn is_complete(&self) -> bool {
        matches!((&self.euid, &self.eutid), (Some(a), Some(b)) if !a.is_empty() && !b.is_empty())
    }
}

/// Persisted widget/session state, survives page loads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub is_premium: bool,
    pub euid: Option<String>,
    pub eutid: Option<String>,
    pub pending_message: Option<String>,
    pub widget_closed: bool,
    pub last_activated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn identity(&self) -> SessionIds {
        SessionIds {
            euid: self.euid.clone(),
            eutid: self.eutid.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_premium: false,
            euid: None,
            eutid: None,
            pending_message: None,
            // The widget never opens on its own after install
            widget_closed: true,
            last_activated_at: None,
        }
    }
}
