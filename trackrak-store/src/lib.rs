pub mod app_config;
pub mod kv;
pub mod redis_repo;
pub mod session;

pub use kv::{KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use redis_repo::RedisStore;
pub use session::{keys, SessionStore};
