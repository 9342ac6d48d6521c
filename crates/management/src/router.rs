//! Campaign builder router: mounts the Meta campaign endpoints under
//! /api/v1/meta.

use crate::handlers::{self, ManagementState};
use axum::routing::{get, post};
use axum::Router;
use campaign_meta::CampaignFactory;
use std::sync::Arc;

/// Build the router with all endpoints. Middleware is added by `ApiServer`.
pub fn management_router(factory: Arc<CampaignFactory>) -> Router {
    let state = ManagementState { factory };

    Router::new()
        .route(
            "/api/v1/meta/campaigns",
            post(handlers::create_campaign).get(handlers::list_campaigns),
        )
        .route("/api/v1/meta/campaigns/:id", get(handlers::get_campaign))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::USER_ID_HEADER;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use campaign_core::types::PersistedCampaign;
    use campaign_core::AdPlatformError;
    use campaign_meta::clients::AccountEdge;
    use campaign_meta::RecordingAdClient;
    use campaign_store::MemoryCampaignStore;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_router(client: RecordingAdClient) -> Router {
        let factory = CampaignFactory::new(
            Arc::new(client),
            Arc::new(MemoryCampaignStore::new()),
            Duration::from_secs(5),
        );
        management_router(Arc::new(factory))
    }

    fn campaign_body(promotion_type: &str) -> String {
        serde_json::json!({
            "promotionType": promotion_type,
            "name": "Fall Sale",
            "adAccountId": "act_1",
            "pageId": "page_1",
            "creative": {"text": "Buy now", "destinationUrl": "https://x.test", "imageRef": "img_1"},
            "budget": {"dailyAmount": 25, "currency": "USD"},
            "schedule": {"startTime": "2025-01-01T00:00:00Z"},
            "targeting": {}
        })
        .to_string()
    }

    fn create_request(user: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/meta/campaigns")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_campaign_returns_created() {
        let app = test_router(RecordingAdClient::new());

        let response = app
            .oneshot(create_request(Some("user-1"), campaign_body("TRAFFIC")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Campaign created successfully");
        assert_eq!(body["campaign"]["status"], "PAUSED");
        assert_eq!(body["campaign"]["user_id"], "user-1");
        assert!(body["metaIds"]["campaignId"].is_string());
        assert!(body["metaIds"]["adId"].is_string());
    }

    #[tokio::test]
    async fn test_missing_user_header_is_unauthorized() {
        let app = test_router(RecordingAdClient::new());

        let response = app
            .oneshot(create_request(None, campaign_body("TRAFFIC")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "missing_user");
    }

    #[tokio::test]
    async fn test_unsupported_type_is_bad_request() {
        let app = test_router(RecordingAdClient::new());

        let response = app
            .oneshot(create_request(Some("user-1"), campaign_body("REMARKETING")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"], "unsupported_promotion_type");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to create campaign: "));
    }

    #[tokio::test]
    async fn test_remote_failure_is_bad_gateway() {
        let client = RecordingAdClient::new().failing_on(
            AccountEdge::AdSets,
            AdPlatformError::Auth("Error validating access token".into()),
        );
        let app = test_router(client);

        let response = app
            .oneshot(create_request(Some("user-1"), campaign_body("AWARENESS")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "remote_call_failed");
        assert!(body["message"].as_str().unwrap().contains("ADSET_CREATED failed"));
    }

    #[tokio::test]
    async fn test_list_and_get_are_scoped_to_caller() {
        let app = test_router(RecordingAdClient::new());

        let created = app
            .clone()
            .oneshot(create_request(Some("user-1"), campaign_body("TRAFFIC")))
            .await
            .unwrap();
        let created: PersistedCampaign =
            serde_json::from_value(json_body(created).await["campaign"].clone()).unwrap();

        let list = Request::builder()
            .uri("/api/v1/meta/campaigns")
            .header(USER_ID_HEADER, "user-1")
            .body(Body::empty())
            .unwrap();
        let body = json_body(app.clone().oneshot(list).await.unwrap()).await;
        assert_eq!(body["total"], 1);

        let own = Request::builder()
            .uri(format!("/api/v1/meta/campaigns/{}", created.id))
            .header(USER_ID_HEADER, "user-1")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(own).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let foreign = Request::builder()
            .uri(format!("/api/v1/meta/campaigns/{}", created.id))
            .header(USER_ID_HEADER, "user-2")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(foreign).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router(RecordingAdClient::new());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
