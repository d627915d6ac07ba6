pub mod auth;
pub mod identity;
pub mod repository;

pub use auth::{AuthClient, AuthResponse, HttpAuthClient};
pub use identity::{IdentityResolver, PageSnapshot};
pub use repository::ActivationLedger;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Identity lookup failed: {0}")]
    IdentityError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
