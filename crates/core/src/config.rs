use serde::Deserialize;
use std::time::Duration;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_BUILDER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

// ─── Meta Graph API Config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MetaConfig {
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// System-user or long-lived page token.
    #[serde(default)]
    pub access_token: String,
    /// Upper bound for a single create call.
    #[serde(default = "default_meta_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_graph_base_url() -> String { "https://graph.facebook.com".to_string() }
fn default_api_version() -> String { "v19.0".to_string() }
fn default_meta_timeout_ms() -> u64 { 15_000 }

impl MetaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            graph_base_url: default_graph_base_url(),
            api_version: default_api_version(),
            access_token: String::new(),
            request_timeout_ms: default_meta_timeout_ms(),
        }
    }
}

// ─── Campaign Store Config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,
    #[serde(default)]
    pub supabase_url: String,
    /// Service-role key; sent as both `apikey` and bearer token.
    #[serde(default)]
    pub supabase_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_store_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_store_backend() -> StoreBackend { StoreBackend::Memory }
fn default_table() -> String { "campaigns".to_string() }
fn default_store_timeout_ms() -> u64 { 10_000 }

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            table: default_table(),
            request_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            meta: MetaConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_BUILDER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject combinations that would only fail later, on the first request.
    pub fn validate(&self) -> Result<(), crate::CampaignError> {
        if self.meta.request_timeout_ms == 0 {
            return Err(crate::CampaignError::Config(
                "meta.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.store.backend == StoreBackend::Supabase
            && (self.store.supabase_url.is_empty() || self.store.supabase_key.is_empty())
        {
            return Err(crate::CampaignError::Config(
                "store.supabase_url and store.supabase_key are required for the supabase backend"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.http_port, 8080);
        assert_eq!(cfg.meta.api_version, "v19.0");
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.table, "campaigns");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_supabase_backend_requires_credentials() {
        let mut cfg = AppConfig::default();
        cfg.store.backend = StoreBackend::Supabase;
        assert!(cfg.validate().is_err());

        cfg.store.supabase_url = "https://proj.supabase.co".into();
        cfg.store.supabase_key = "service-key".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = AppConfig::default();
        cfg.meta.request_timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }
}
