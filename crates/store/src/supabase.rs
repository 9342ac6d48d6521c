//! Supabase (PostgREST) campaign store.

use crate::CampaignStore;
use async_trait::async_trait;
use campaign_core::config::StoreConfig;
use campaign_core::types::PersistedCampaign;
use campaign_core::StoreError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};
use uuid::Uuid;

/// Campaign store talking to a Supabase project's REST endpoint.
pub struct SupabaseCampaignStore {
    http: reqwest::Client,
    table_url: String,
}

impl SupabaseCampaignStore {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&config.supabase_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.supabase_key))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        let table_url = format!(
            "{}/rest/v1/{}",
            config.supabase_url.trim_end_matches('/'),
            config.table
        );

        info!(table_url = %table_url, "Supabase campaign store configured");

        Ok(Self { http, table_url })
    }

    async fn read_rows(&self, response: reqwest::Response) -> Result<Vec<PersistedCampaign>, StoreError> {
        let status = response.status();
        let body = response.text().await.map_err(unavailable)?;
        if !status.is_success() {
            metrics::counter!("store.errors").increment(1);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn unavailable(e: reqwest::Error) -> StoreError {
    metrics::counter!("store.errors").increment(1);
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl CampaignStore for SupabaseCampaignStore {
    async fn insert(&self, campaign: &PersistedCampaign) -> Result<PersistedCampaign, StoreError> {
        let response = self
            .http
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(campaign)
            .send()
            .await
            .map_err(unavailable)?;

        let stored = self
            .read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))?;

        metrics::counter!("store.inserts").increment(1);
        debug!(campaign_id = %stored.id, user_id = %stored.user_id, "Campaign row inserted");
        Ok(stored)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PersistedCampaign>, StoreError> {
        let response = self
            .http
            .get(&self.table_url)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await
            .map_err(unavailable)?;

        self.read_rows(response).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<PersistedCampaign>, StoreError> {
        let response = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(unavailable)?;

        Ok(self.read_rows(response).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::{MetaObjective, PromotionType, RemoteStatus};
    use chrono::Utc;
    use mockito::Matcher;

    fn config(url: &str) -> StoreConfig {
        StoreConfig {
            supabase_url: url.to_string(),
            supabase_key: "service-key".to_string(),
            ..StoreConfig::default()
        }
    }

    fn row() -> PersistedCampaign {
        PersistedCampaign {
            id: Uuid::new_v4(),
            user_id: "user-7".into(),
            meta_campaign_id: "120001".into(),
            meta_ad_set_id: "120002".into(),
            meta_creative_id: "120003".into(),
            meta_ad_id: "120004".into(),
            name: "Fall Sale".into(),
            promotion_type: PromotionType::Sales,
            status: RemoteStatus::Paused,
            objective: MetaObjective::OutcomeSales,
            daily_budget: 25.0,
            currency: "USD".into(),
            start_time: Utc::now(),
            end_time: None,
            config: serde_json::json!({"name": "Fall Sale"}),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_sends_representation_request() {
        let mut server = mockito::Server::new_async().await;
        let campaign = row();
        let body = serde_json::to_string(&vec![campaign.clone()]).unwrap();

        let mock = server
            .mock("POST", "/rest/v1/campaigns")
            .match_header("apikey", "service-key")
            .match_header("authorization", "Bearer service-key")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "user_id": "user-7",
                "meta_ad_id": "120004",
                "status": "PAUSED"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let store = SupabaseCampaignStore::new(&config(&server.url())).unwrap();
        let stored = store.insert(&campaign).await.unwrap();

        assert_eq!(stored.id, campaign.id);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_insert_rejection_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/campaigns")
            .with_status(400)
            .with_body(r#"{"message":"null value in column \"user_id\""}"#)
            .create_async()
            .await;

        let store = SupabaseCampaignStore::new(&config(&server.url())).unwrap();
        let err = store.insert(&row()).await.unwrap_err();

        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("user_id"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::to_string(&vec![row(), row()]).unwrap();

        let mock = server
            .mock("GET", "/rest/v1/campaigns")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "eq.user-7".into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let store = SupabaseCampaignStore::new(&config(&server.url())).unwrap();
        let rows = store.list_for_user("user-7").await.unwrap();

        assert_eq!(rows.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_row_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/campaigns")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = SupabaseCampaignStore::new(&config(&server.url())).unwrap();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
