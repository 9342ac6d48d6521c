//! Campaign persistence: the record of truth for campaigns created on Meta.
//!
//! Two backends share the `CampaignStore` contract: `MemoryCampaignStore`
//! (DashMap, development and tests) and `SupabaseCampaignStore` (PostgREST).

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use campaign_core::config::{StoreBackend, StoreConfig};
use campaign_core::types::PersistedCampaign;
use campaign_core::StoreError;
use std::sync::Arc;
use uuid::Uuid;

pub use memory::MemoryCampaignStore;
pub use supabase::SupabaseCampaignStore;

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Write one row to the campaigns table and return it as stored.
    async fn insert(&self, campaign: &PersistedCampaign) -> Result<PersistedCampaign, StoreError>;

    /// All campaigns owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PersistedCampaign>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<PersistedCampaign>, StoreError>;
}

/// Build the backend selected in configuration.
pub fn from_config(config: &StoreConfig) -> anyhow::Result<Arc<dyn CampaignStore>> {
    let store: Arc<dyn CampaignStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryCampaignStore::new()),
        StoreBackend::Supabase => Arc::new(SupabaseCampaignStore::new(config)?),
    };
    Ok(store)
}
