//! In-process ad-platform client that records every call and mints ids
//! locally. Backs the binary's `--dry-run` mode and the factory tests.

use crate::clients::{AccountEdge, AdPlatformClient};
use async_trait::async_trait;
use campaign_core::types::*;
use campaign_core::AdPlatformError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Campaign { account_id: String, payload: CampaignPayload },
    AdSet { account_id: String, payload: AdSetPayload },
    Creative { account_id: String, payload: CreativePayload },
    Ad { account_id: String, payload: AdPayload },
}

impl RecordedCall {
    pub fn edge(&self) -> AccountEdge {
        match self {
            RecordedCall::Campaign { .. } => AccountEdge::Campaigns,
            RecordedCall::AdSet { .. } => AccountEdge::AdSets,
            RecordedCall::Creative { .. } => AccountEdge::AdCreatives,
            RecordedCall::Ad { .. } => AccountEdge::Ads,
        }
    }
}

pub struct RecordingAdClient {
    calls: Mutex<Vec<RecordedCall>>,
    next_id: AtomicU64,
    failure: Option<(AccountEdge, AdPlatformError)>,
    delay: Option<Duration>,
}

impl RecordingAdClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failure: None,
            delay: None,
        }
    }

    /// Reject every call to `edge` with `error`.
    pub fn failing_on(mut self, edge: AccountEdge, error: AdPlatformError) -> Self {
        self.failure = Some((edge, error));
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn respond(&self, call: RecordedCall) -> Result<RemoteObject, AdPlatformError> {
        let edge = call.edge();
        self.calls.lock().push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((failing_edge, error)) = &self.failure {
            if *failing_edge == edge {
                return Err(error.clone());
            }
        }

        let id = format!("{}-{}", edge.path(), self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(edge = edge.path(), remote_id = %id, "Dry-run object created");
        Ok(RemoteObject { id })
    }
}

impl Default for RecordingAdClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdPlatformClient for RecordingAdClient {
    async fn create_campaign(
        &self,
        account_id: &str,
        payload: &CampaignPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.respond(RecordedCall::Campaign {
            account_id: account_id.to_string(),
            payload: payload.clone(),
        })
        .await
    }

    async fn create_ad_set(
        &self,
        account_id: &str,
        payload: &AdSetPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.respond(RecordedCall::AdSet {
            account_id: account_id.to_string(),
            payload: payload.clone(),
        })
        .await
    }

    async fn create_ad_creative(
        &self,
        account_id: &str,
        payload: &CreativePayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.respond(RecordedCall::Creative {
            account_id: account_id.to_string(),
            payload: payload.clone(),
        })
        .await
    }

    async fn create_ad(
        &self,
        account_id: &str,
        payload: &AdPayload,
    ) -> Result<RemoteObject, AdPlatformError> {
        self.respond(RecordedCall::Ad {
            account_id: account_id.to_string(),
            payload: payload.clone(),
        })
        .await
    }
}
