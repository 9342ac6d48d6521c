//! Ad-platform client implementations.
//! The factory talks to the `AdPlatformClient` trait only; `MetaGraphClient`
//! translates each call into a Marketing API request.

use async_trait::async_trait;
use campaign_core::config::MetaConfig;
use campaign_core::types::*;
use campaign_core::AdPlatformError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Trait for ad-platform clients. Every method creates exactly one remote
/// object and returns its id.
#[async_trait]
pub trait AdPlatformClient: Send + Sync {
    async fn create_campaign(
        &self,
        account_id: &str,
        payload: &CampaignPayload,
    ) -> Result<RemoteObject, AdPlatformError>;

    async fn create_ad_set(
        &self,
        account_id: &str,
        payload: &AdSetPayload,
    ) -> Result<RemoteObject, AdPlatformError>;

    async fn create_ad_creative(
        &self,
        account_id: &str,
        payload: &CreativePayload,
    ) -> Result<RemoteObject, AdPlatformError>;

    async fn create_ad(
        &self,
        account_id: &str,
        payload: &AdPayload,
    ) -> Result<RemoteObject, AdPlatformError>;
}

/// Ad-account edges the client posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEdge {
    Campaigns,
    AdSets,
    AdCreatives,
    Ads,
}

impl AccountEdge {
    pub fn path(&self) -> &'static str {
        match self {
            AccountEdge::Campaigns => "campaigns",
            AccountEdge::AdSets => "adsets",
            AccountEdge::AdCreatives => "adcreatives",
            AccountEdge::Ads => "ads",
        }
    }
}

/// Graph API node ids for ad accounts carry an `act_` prefix; the wizard
/// sometimes sends the bare numeric id.
pub fn normalize_account_id(account_id: &str) -> String {
    let bare = account_id.trim().trim_start_matches("act_");
    format!("act_{bare}")
}

/// OAuthException: expired, revoked or malformed token.
const OAUTH_EXCEPTION_CODE: i64 = 190;

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

/// Map a non-2xx Graph API response onto the client error taxonomy.
pub fn parse_graph_error(status: u16, body: &str) -> AdPlatformError {
    let auth_status = status == 401 || status == 403;
    match serde_json::from_str::<GraphErrorEnvelope>(body) {
        Ok(envelope) => {
            let err = envelope.error;
            if auth_status || err.code == Some(OAUTH_EXCEPTION_CODE) {
                AdPlatformError::Auth(err.message)
            } else {
                AdPlatformError::Api {
                    status,
                    code: err.code,
                    message: err.message,
                    fbtrace_id: err.fbtrace_id,
                }
            }
        }
        Err(_) if auth_status => AdPlatformError::Auth(body.to_string()),
        Err(_) => AdPlatformError::Api {
            status,
            code: None,
            message: body.to_string(),
            fbtrace_id: None,
        },
    }
}

// ─── Meta Graph API ─────────────────────────────────────────────────────────

pub struct MetaGraphClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    access_token: String,
    timeout_ms: u64,
}

impl MetaGraphClient {
    pub fn new(config: &MetaConfig) -> anyhow::Result<Self> {
        let base = url::Url::parse(&config.graph_base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        info!(
            base_url = %base,
            api_version = %config.api_version,
            "Meta Graph API client initialized"
        );

        Ok(Self {
            http,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            access_token: config.access_token.clone(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    fn edge_url(&self, account_id: &str, edge: AccountEdge) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.api_version,
            normalize_account_id(account_id),
            edge.path()
        )
    }

    fn transport_error(&self, e: reqwest::Error) -> AdPlatformError {
        if e.is_timeout() {
            AdPlatformError::Timeout(self.timeout_ms)
        } else {
            AdPlatformError::Transport(e.to_string())
        }
    }

    async fn post<T: Serialize + Sync>(
        &self,
        account_id: &str,
        edge: AccountEdge,
        payload: &T,
    ) -> Result<RemoteObject, AdPlatformError> {
        let start = Instant::now();
        let url = self.edge_url(account_id, edge);

        let mut body = serde_json::to_value(payload)
            .map_err(|e| AdPlatformError::Decode(format!("payload encoding: {e}")))?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert(
                "access_token".to_string(),
                serde_json::Value::String(self.access_token.clone()),
            );
        }

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!(
            edge = edge.path(),
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Graph API call completed"
        );

        if !status.is_success() {
            return Err(parse_graph_error(status.as_u16(), &text));
        }

        serde_json::from_str::<RemoteObject>(&text)
            .map_err(|e| AdPlatformError::Decode(format!("{e}: {text}")))
    }
}

#[async_trait]
impl AdPlatformClient for MetaGraphClient {
    async fn create_campaign(
        &self,
        account_id: &str,
        payload: &CampaignPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.post(account_id, AccountEdge::Campaigns, payload).await
    }

    async fn create_ad_set(
        &self,
        account_id: &str,
        payload: &AdSetPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.post(account_id, AccountEdge::AdSets, payload).await
    }

    async fn create_ad_creative(
        &self,
        account_id: &str,
        payload: &CreativePayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.post(account_id, AccountEdge::AdCreatives, payload).await
    }

    async fn create_ad(
        &self,
        account_id: &str,
        payload: &AdPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.post(account_id, AccountEdge::Ads, payload).await
    }
}
