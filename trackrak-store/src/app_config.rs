use serde::Deserialize;
use std::env;
use std::time::Duration;
use trackrak_core::auth::DEFAULT_LOGIN_URL;
use trackrak_core::identity::{ACTIVATION_PAGE_PREFIXES, ACTIVATION_PAGE_URL};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub activation: ActivationConfig,
    pub auth: AuthConfig,
    pub widget: WidgetConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub topic_id: u64,
    pub sort: String,
    pub page_delay_ms: u64,
    pub max_pages: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.rakuten.com/feedapi/v1/regions/USA/topic".to_string(),
            topic_id: 43461,
            sort: "alphabetical".to_string(),
            page_delay_ms: 200,
            max_pages: 500,
        }
    }
}

impl CatalogConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ActivationConfig {
    pub url: String,
    pub source_name: String,
    pub source_id: u64,
    pub request_delay_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            url: "https://rrcloapi.rrcbsn.com/offers_linker/v1/link-all-cards-to-offers".to_string(),
            source_name: "Web-Desktop".to_string(),
            source_id: 6991168,
            request_delay_ms: 120,
        }
    }
}

impl ActivationConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub login_url: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            max_retries: 2,
            retry_delay_ms: 400,
            timeout_secs: 15,
        }
    }
}

impl AuthConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WidgetConfig {
    pub activation_page_url: String,
    pub allowed_prefixes: Vec<String>,
    pub reload_delay_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            activation_page_url: ACTIVATION_PAGE_URL.to_string(),
            allowed_prefixes: ACTIVATION_PAGE_PREFIXES.iter().map(|p| p.to_string()).collect(),
            reload_delay_ms: 800,
        }
    }
}

impl WidgetConfig {
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            namespace: "trackrak".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Shipped defaults
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TRACKRAK__AUTH__TIMEOUT_SECS=30`
            .add_source(config::Environment::with_prefix("TRACKRAK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
