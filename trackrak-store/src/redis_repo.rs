use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::info;

use crate::kv::{KeyValueStore, StoreError, StoreResult};

/// Redis-backed session store; values are JSON documents under
/// `{namespace}:{key}`.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    namespace: String,
}

impl RedisStore {
    pub async fn new(connection_string: &str, namespace: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis session store ready (namespace {})", namespace);
        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.namespaced(key)).await?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(self.namespaced(key), value.to_string()).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(self.namespaced(key)).await?;
        Ok(())
    }
}
