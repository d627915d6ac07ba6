pub mod activation;
pub mod offer;
pub mod session;
