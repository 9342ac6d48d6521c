//! In-memory campaign store backed by DashMap.
//!
//! Production: use the Supabase backend. This provides the same API surface
//! for development and testing.

use crate::CampaignStore;
use async_trait::async_trait;
use campaign_core::types::PersistedCampaign;
use campaign_core::StoreError;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

/// Thread-safe in-memory store for persisted campaigns.
pub struct MemoryCampaignStore {
    campaigns: DashMap<Uuid, PersistedCampaign>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        info!("Campaign store initialized (in-memory, development mode)");
        Self {
            campaigns: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

impl Default for MemoryCampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn insert(&self, campaign: &PersistedCampaign) -> Result<PersistedCampaign, StoreError> {
        if self.campaigns.contains_key(&campaign.id) {
            metrics::counter!("store.errors").increment(1);
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("duplicate key: campaign {} already exists", campaign.id),
            });
        }
        self.campaigns.insert(campaign.id, campaign.clone());
        metrics::counter!("store.inserts").increment(1);
        Ok(campaign.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PersistedCampaign>, StoreError> {
        let mut campaigns: Vec<PersistedCampaign> = self
            .campaigns
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PersistedCampaign>, StoreError> {
        Ok(self.campaigns.get(&id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::{MetaObjective, PromotionType, RemoteStatus};
    use chrono::{Duration, Utc};

    fn row(user_id: &str, minutes_ago: i64) -> PersistedCampaign {
        let now = Utc::now();
        PersistedCampaign {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            meta_campaign_id: "c1".into(),
            meta_ad_set_id: "s1".into(),
            meta_creative_id: "cr1".into(),
            meta_ad_id: "a1".into(),
            name: "Spring Promo".into(),
            promotion_type: PromotionType::Awareness,
            status: RemoteStatus::Paused,
            objective: MetaObjective::OutcomeAwareness,
            daily_budget: 20.0,
            currency: "USD".into(),
            start_time: now,
            end_time: None,
            config: serde_json::json!({}),
            created_at: now - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryCampaignStore::new();
        let campaign = row("user-1", 0);

        let stored = store.insert(&campaign).await.unwrap();
        assert_eq!(stored, campaign);
        assert_eq!(store.len(), 1);

        let fetched = store.get(campaign.id).await.unwrap().unwrap();
        assert_eq!(fetched.meta_campaign_id, "c1");
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryCampaignStore::new();
        let campaign = row("user-1", 0);
        store.insert(&campaign).await.unwrap();

        let err = store.insert(&campaign).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_scoped_to_user_newest_first() {
        let store = MemoryCampaignStore::new();
        let older = row("user-1", 30);
        let newer = row("user-1", 5);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&row("user-2", 1)).await.unwrap();

        let listed = store.list_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }
}
