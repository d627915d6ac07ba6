use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use trackrak_shared::Masked;

use crate::{CoreError, CoreResult};

pub const DEFAULT_LOGIN_URL: &str = "https://trackrak.com/api/auth/sub";

/// Status and (optionally parsed) body returned by the login endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl AuthResponse {
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `{"message": "authorized", "plan": "premium"}`
    pub fn is_authorized_premium(&self) -> bool {
        let Some(body) = self.body.as_ref() else {
            return false;
        };
        body.get("message").and_then(Value::as_str) == Some("authorized")
            && body.get("plan").and_then(Value::as_str) == Some("premium")
    }
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Submit credentials; `None` means the endpoint could not be reached
    async fn login(&self, email: &str, password: &Masked<String>) -> Option<AuthResponse>;
}

/// Reject missing credentials before any network call.
pub fn validate_credentials(email: &str, password: &str) -> CoreResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::ValidationError(
            "Please enter email and password.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a Masked<String>,
}

/// Login client for the TrackRak entitlement endpoint.
///
/// Transport failures are retried with a fixed backoff; HTTP responses of
/// any status are returned as-is.
pub struct HttpAuthClient {
    client: reqwest::Client,
    login_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpAuthClient {
    pub fn new(login_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), login_url)
    }

    pub fn with_client(client: reqwest::Client, login_url: String) -> Self {
        Self {
            client,
            login_url,
            max_retries: 2,
            retry_delay: Duration::from_millis(400),
        }
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, email: &str, password: &Masked<String>) -> Option<AuthResponse> {
        let payload = LoginPayload {
            email: email.trim(),
            password,
        };

        let mut attempt = 0u32;
        loop {
            let result = self
                .client
                .post(&self.login_url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = match response.bytes().await {
                        Ok(bytes) => serde_json::from_slice(&bytes).ok(),
                        Err(_) => None,
                    };
                    tracing::info!(status, "Login endpoint responded");
                    return Some(AuthResponse { status, body });
                }
                Err(e) if attempt < self.max_retries => {
                    tracing::warn!(attempt, "Login network error, retrying: {}", e);
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(attempts = attempt + 1, "Login failed after retries: {}", e);
                    return None;
                }
            }
        }
    }
}
