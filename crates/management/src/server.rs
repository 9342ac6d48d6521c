//! API server: HTTP endpoints plus the Prometheus metrics listener.

use crate::router::management_router;
use campaign_core::config::AppConfig;
use campaign_meta::CampaignFactory;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    factory: Arc<CampaignFactory>,
}

impl ApiServer {
    pub fn new(config: AppConfig, factory: Arc<CampaignFactory>) -> Self {
        Self { config, factory }
    }

    /// Serve the REST API until the process is stopped.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = management_router(self.factory.clone())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on its own port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.metrics.port);
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
