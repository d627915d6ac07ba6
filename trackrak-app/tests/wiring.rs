use std::sync::Arc;
use tokio::sync::mpsc;
use trackrak_app::{build_controller, open_store, ConsoleHost};
use trackrak_core::PageSnapshot;
use trackrak_store::app_config::{Config, StoreBackend, StoreConfig};
use trackrak_store::SessionStore;
use trackrak_widget::{ControllerError, FlowState, Lifecycle};

fn console() -> Arc<ConsoleHost> {
    let (tx, _rx) = mpsc::channel(4);
    Arc::new(ConsoleHost::new(PageSnapshot::default(), tx))
}

#[tokio::test]
async fn test_memory_store_by_default() {
    let store = open_store(&StoreConfig::default()).await.unwrap();
    let session = SessionStore::new(store);

    assert!(session.widget_closed().await.unwrap());
    assert!(!session.is_premium().await.unwrap());
}

#[tokio::test]
async fn test_redis_backend_requires_url() {
    let config = StoreConfig {
        backend: StoreBackend::Redis,
        redis_url: None,
        ..Default::default()
    };
    let err = open_store(&config).await.err().unwrap();
    assert!(err.to_string().contains("store.redis_url"));
}

#[tokio::test]
async fn test_fresh_controller_starts_closed() {
    let config = Config::default();
    let session = SessionStore::new(open_store(&config.store).await.unwrap());
    let lifecycle = Lifecycle::new();

    let mut controller = build_controller(&config, &lifecycle, session, console()).unwrap();
    controller.start().await;

    assert_eq!(controller.state(), &FlowState::Closed);
}

#[tokio::test]
async fn test_one_controller_per_page() {
    let config = Config::default();
    let session = SessionStore::new(open_store(&config.store).await.unwrap());
    let lifecycle = Lifecycle::new();

    let _first = build_controller(&config, &lifecycle, session.clone(), console()).unwrap();
    let second = build_controller(&config, &lifecycle, session, console());

    let err = second.err().unwrap();
    assert!(matches!(err.downcast_ref::<ControllerError>(), Some(ControllerError::AlreadyMounted)));
}
