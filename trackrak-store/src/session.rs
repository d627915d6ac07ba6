use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use trackrak_core::ActivationLedger;
use trackrak_shared::{SessionIds, SessionState};

use crate::kv::{KeyValueStore, StoreResult};

/// Persisted keys
pub mod keys {
    pub const IS_PREMIUM: &str = "isPremium";
    pub const EUID: &str = "euid";
    pub const EUTID: &str = "eutid";
    pub const PENDING_MESSAGE: &str = "pendingCompletionMessage";
    pub const WIDGET_CLOSED: &str = "widgetClosed";
    pub const LAST_ACTIVATED_AT: &str = "lastActivatedAt";
}

/// Typed view over the key/value store holding the widget session
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub async fn is_premium(&self) -> StoreResult<bool> {
        Ok(match self.backend.get(keys::IS_PREMIUM).await? {
            Some(Value::Bool(flag)) => flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        })
    }

    pub async fn set_premium(&self, premium: bool) -> StoreResult<()> {
        self.backend.set(keys::IS_PREMIUM, Value::Bool(premium)).await
    }

    pub async fn identity(&self) -> StoreResult<SessionIds> {
        Ok(SessionIds {
            euid: self.get_string(keys::EUID).await?,
            eutid: self.get_string(keys::EUTID).await?,
        })
    }

    /// Absent identifiers are removed so reads give back exactly `None`.
    pub async fn set_identity(&self, ids: &SessionIds) -> StoreResult<()> {
        self.put_optional(keys::EUID, ids.euid.as_deref()).await?;
        self.put_optional(keys::EUTID, ids.eutid.as_deref()).await
    }

    pub async fn pending_message(&self) -> StoreResult<Option<String>> {
        self.get_string(keys::PENDING_MESSAGE).await
    }

    pub async fn set_pending_message(&self, message: &str) -> StoreResult<()> {
        self.backend
            .set(keys::PENDING_MESSAGE, Value::String(message.to_string()))
            .await
    }

    pub async fn clear_pending_message(&self) -> StoreResult<()> {
        self.backend.remove(keys::PENDING_MESSAGE).await
    }

    /// Defaults to closed when the flag was never written
    pub async fn widget_closed(&self) -> StoreResult<bool> {
        let value = self.backend.get(keys::WIDGET_CLOSED).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(true))
    }

    pub async fn set_widget_closed(&self, closed: bool) -> StoreResult<()> {
        self.backend.set(keys::WIDGET_CLOSED, Value::Bool(closed)).await
    }

    pub async fn last_activated_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self
            .get_string(keys::LAST_ACTIVATED_AT)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    /// Read the whole session; a failed read falls back to that field's default.
    pub async fn load(&self) -> SessionState {
        let defaults = SessionState::default();
        let identity = or_default(self.identity().await, SessionIds::empty(), "identity");

        SessionState {
            is_premium: or_default(self.is_premium().await, defaults.is_premium, keys::IS_PREMIUM),
            euid: identity.euid,
            eutid: identity.eutid,
            pending_message: or_default(self.pending_message().await, None, keys::PENDING_MESSAGE),
            widget_closed: or_default(self.widget_closed().await, defaults.widget_closed, keys::WIDGET_CLOSED),
            last_activated_at: or_default(self.last_activated_at().await, None, keys::LAST_ACTIVATED_AT),
        }
    }

    async fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .backend
            .get(key)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn put_optional(&self, key: &str, value: Option<&str>) -> StoreResult<()> {
        match value {
            Some(v) => self.backend.set(key, Value::String(v.to_string())).await,
            None => self.backend.remove(key).await,
        }
    }
}

fn or_default<T>(result: StoreResult<T>, default: T, field: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(field, "Session store read failed: {}", e);
        default
    })
}

#[async_trait]
impl ActivationLedger for SessionStore {
    async fn record_last_activation(
        &self,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.backend
            .set(keys::LAST_ACTIVATED_AT, Value::String(at.to_rfc3339()))
            .await?;
        Ok(())
    }
}
