pub mod activation;
pub mod orchestrator;

pub use activation::{ActivationError, HttpActivationClient, OfferActivator, TrackingTicket};
pub use orchestrator::ActivationOrchestrator;
