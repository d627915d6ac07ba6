use anyhow::Context;
use std::sync::Arc;
use trackrak_catalog::{CatalogClient, HttpCatalogFeed};
use trackrak_core::{HttpAuthClient, IdentityResolver};
use trackrak_offer::{ActivationOrchestrator, HttpActivationClient, TrackingTicket};
use trackrak_store::app_config::{Config, StoreBackend, StoreConfig};
use trackrak_store::{KeyValueStore, MemoryStore, RedisStore, SessionStore};
use trackrak_widget::{ControllerSettings, Lifecycle, WidgetFlowController, WidgetHost};

/// Session backend selected by `store.backend`.
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory session store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("store.redis_url is required when store.backend = \"redis\"")?;
            let store = RedisStore::new(url, &config.namespace)
                .await
                .context("Failed to open Redis session store")?;
            Ok(Arc::new(store))
        }
    }
}

/// Assemble the controller and its HTTP collaborators from configuration.
pub fn build_controller(
    config: &Config,
    lifecycle: &Lifecycle,
    session: SessionStore,
    host: Arc<dyn WidgetHost>,
) -> anyhow::Result<WidgetFlowController> {
    let auth_http = reqwest::Client::builder()
        .timeout(config.auth.timeout())
        .build()
        .context("Failed to build auth HTTP client")?;
    let auth = HttpAuthClient::with_client(auth_http, config.auth.login_url.clone())
        .with_retries(config.auth.max_retries, config.auth.retry_delay());

    let feed = HttpCatalogFeed::new(
        config.catalog.base_url.clone(),
        config.catalog.topic_id,
        config.catalog.sort.clone(),
    );
    let catalog = CatalogClient::new(Arc::new(feed))
        .with_page_delay(config.catalog.page_delay())
        .with_max_pages(config.catalog.max_pages);

    let ticket = TrackingTicket {
        source_name: config.activation.source_name.clone(),
        source_id: config.activation.source_id,
    };
    let activator = HttpActivationClient::new(config.activation.url.clone(), ticket);
    let orchestrator = ActivationOrchestrator::new(Arc::new(activator))
        .with_ledger(Arc::new(session.clone()))
        .with_request_delay(config.activation.request_delay());

    let controller = WidgetFlowController::new(
        lifecycle,
        session,
        IdentityResolver::new(config.widget.allowed_prefixes.clone()),
        Arc::new(auth),
        Arc::new(catalog),
        Arc::new(orchestrator),
        host,
    )?
    .with_settings(ControllerSettings {
        activation_page_url: config.widget.activation_page_url.clone(),
        auth_timeout: config.auth.timeout(),
        reload_delay: config.widget.reload_delay(),
    });

    Ok(controller)
}
