use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Records when the last activation run completed
#[async_trait]
pub trait ActivationLedger: Send + Sync {
    async fn record_last_activation(
        &self,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
