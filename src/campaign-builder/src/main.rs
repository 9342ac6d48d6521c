//! Campaign Builder: creates Meta ad campaigns from the campaign wizard.
//!
//! Main entry point that wires configuration, the Graph API client, the
//! campaign store and the HTTP server.

use campaign_core::config::{AppConfig, StoreBackend};
use campaign_management::ApiServer;
use campaign_meta::{AdPlatformClient, CampaignFactory, MetaGraphClient, RecordingAdClient};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-builder")]
#[command(about = "Creates Meta ad campaigns from the campaign wizard")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long, env = "CAMPAIGN_BUILDER__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_BUILDER__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Store campaigns in process memory instead of Supabase
    #[arg(long, default_value_t = false)]
    memory_store: bool,

    /// Mint remote ids locally instead of calling the Graph API
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_builder=info,campaign_meta=info,campaign_store=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Builder starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.memory_store {
        config.store.backend = StoreBackend::Memory;
    }
    config.validate()?;

    info!(
        http_port = config.api.http_port,
        store_backend = ?config.store.backend,
        api_version = %config.meta.api_version,
        dry_run = cli.dry_run,
        "Configuration loaded"
    );

    let client: Arc<dyn AdPlatformClient> = if cli.dry_run {
        warn!("Dry-run mode: no objects will be created on Meta");
        Arc::new(RecordingAdClient::new())
    } else {
        if config.meta.access_token.is_empty() {
            warn!("meta.access_token is empty; Graph API calls will be rejected");
        }
        Arc::new(MetaGraphClient::new(&config.meta)?)
    };

    let store = campaign_store::from_config(&config.store)?;

    let factory = Arc::new(CampaignFactory::new(
        client,
        store,
        config.meta.request_timeout(),
    ));

    let api_server = ApiServer::new(config.clone(), factory);

    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Campaign Builder is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
