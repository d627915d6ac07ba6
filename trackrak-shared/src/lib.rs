pub mod models;
pub mod pii;

pub use models::activation::{ActivationProgress, ActivationResult, ActivationRun};
pub use models::offer::{Offer, OfferId, OfferStatus, PageCursor};
pub use models::session::{SessionIds, SessionState};
pub use pii::Masked;
