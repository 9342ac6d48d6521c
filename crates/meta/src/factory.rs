//! Campaign factory: picks the strategy for a request and creates campaign,
//! ad set, creative and ad on the platform, in that order, before writing the
//! single local record.
//!
//! Remote objects created before a failing step are left in place. There is
//! no compensating delete; the failure is logged with every orphaned id.

use crate::attempt::CreationAttempt;
use crate::clients::AdPlatformClient;
use crate::strategies::{merge_targeting, strategy_for, to_minor_units, CampaignStrategy};
use campaign_core::types::*;
use campaign_core::{AdPlatformError, CampaignError, CampaignResult};
use campaign_store::CampaignStore;
use chrono::{NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const CREATED_MESSAGE: &str = "Campaign created successfully";

/// `{PROMOTION_TYPE} - {name} - {YYYY-MM-DD}`
pub fn campaign_name(promotion_type: PromotionType, name: &str, day: NaiveDate) -> String {
    format!("{} - {} - {}", promotion_type, name, day.format("%Y-%m-%d"))
}

/// Checks that apply to every promotion type, run before any remote call.
pub fn validate_request(request: &CampaignRequest) -> CampaignResult<()> {
    let blank = |field: &str| CampaignError::Validation(format!("{field} must not be empty"));
    if request.ad_account_id.trim().is_empty() {
        return Err(blank("adAccountId"));
    }
    if request.page_id.trim().is_empty() {
        return Err(blank("pageId"));
    }
    if request.name.trim().is_empty() {
        return Err(blank("name"));
    }
    if request.budget.currency.trim().is_empty() {
        return Err(blank("budget.currency"));
    }

    to_minor_units(request.budget.daily_amount)?;
    merge_targeting(&request.targeting)?;

    if let Some(end) = request.schedule.end_time {
        if end <= request.schedule.start_time {
            return Err(CampaignError::Validation(
                "schedule.endTime must be after schedule.startTime".to_string(),
            ));
        }
    }
    Ok(())
}

/// Orchestrates campaign creation. Holds no per-request state, so one
/// instance is shared across all handler tasks.
pub struct CampaignFactory {
    client: Arc<dyn AdPlatformClient>,
    store: Arc<dyn CampaignStore>,
    call_timeout: Duration,
}

impl CampaignFactory {
    pub fn new(
        client: Arc<dyn AdPlatformClient>,
        store: Arc<dyn CampaignStore>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            store,
            call_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn CampaignStore> {
        &self.store
    }

    /// Create a campaign for `caller`. Not idempotent: two identical calls
    /// produce two remote campaigns and two rows.
    pub async fn create_campaign(
        &self,
        caller: &Caller,
        request: &CampaignRequest,
    ) -> CampaignResult<CreationResult> {
        let promotion_type = request.promotion_type;

        let Some(strategy) = strategy_for(promotion_type) else {
            warn!(promotion_type = %promotion_type, "No strategy registered for promotion type");
            metrics::counter!("meta.campaigns.failed", "stage" => CreationStage::Start.as_str())
                .increment(1);
            return Err(CampaignError::UnsupportedPromotionType(promotion_type));
        };

        if let Err(e) = validate_request(request) {
            warn!(promotion_type = %promotion_type, error = %e, "Campaign request rejected");
            metrics::counter!("meta.campaigns.failed", "stage" => CreationStage::Start.as_str())
                .increment(1);
            return Err(e);
        }

        let start = Instant::now();
        let mut attempt = CreationAttempt::new();

        match self.execute(&mut attempt, strategy, caller, request).await {
            Ok(result) => {
                metrics::counter!("meta.campaigns.created", "promotion_type" => promotion_type.as_str())
                    .increment(1);
                info!(
                    user_id = %caller.user_id,
                    promotion_type = %promotion_type,
                    campaign_id = %result.meta_ids.campaign_id,
                    row_id = %result.campaign.id,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Campaign created"
                );
                Ok(result)
            }
            Err(e) => {
                let failed_step = attempt.pending_step();
                attempt.fail();
                report_failure(&attempt, failed_step, caller, request, &e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        attempt: &mut CreationAttempt,
        strategy: &dyn CampaignStrategy,
        caller: &Caller,
        request: &CampaignRequest,
    ) -> CampaignResult<CreationResult> {
        let account_id = request.ad_account_id.as_str();

        let campaign_payload = CampaignPayload {
            name: campaign_name(request.promotion_type, &request.name, Utc::now().date_naive()),
            objective: strategy.objective(),
            status: RemoteStatus::Paused,
            special_ad_categories: Vec::new(),
        };
        let campaign = self
            .call(
                CreationStage::CampaignCreated,
                self.client.create_campaign(account_id, &campaign_payload),
            )
            .await?;
        attempt.record_campaign(campaign.id.clone())?;

        let ad_set_payload = strategy.build_ad_set_payload(request, &campaign.id)?;
        let ad_set = self
            .call(
                CreationStage::AdSetCreated,
                self.client.create_ad_set(account_id, &ad_set_payload),
            )
            .await?;
        attempt.record_ad_set(ad_set.id.clone())?;

        let creative_payload = strategy.build_creative_payload(&request.creative, &request.page_id)?;
        let creative = self
            .call(
                CreationStage::CreativeCreated,
                self.client.create_ad_creative(account_id, &creative_payload),
            )
            .await?;
        attempt.record_creative(creative.id.clone())?;

        let ad_payload = AdPayload {
            name: format!("Ad - {}", request.name),
            adset_id: ad_set.id.clone(),
            creative: AdCreativeRef {
                creative_id: creative.id.clone(),
            },
            status: RemoteStatus::Paused,
        };
        let ad = self
            .call(CreationStage::AdCreated, self.client.create_ad(account_id, &ad_payload))
            .await?;
        attempt.record_ad(ad.id.clone())?;

        let meta_ids = MetaIds {
            campaign_id: campaign.id,
            ad_set_id: ad_set.id,
            creative_id: creative.id,
            ad_id: ad.id,
        };

        let row = PersistedCampaign {
            id: Uuid::new_v4(),
            user_id: caller.user_id.clone(),
            meta_campaign_id: meta_ids.campaign_id.clone(),
            meta_ad_set_id: meta_ids.ad_set_id.clone(),
            meta_creative_id: meta_ids.creative_id.clone(),
            meta_ad_id: meta_ids.ad_id.clone(),
            name: request.name.clone(),
            promotion_type: request.promotion_type,
            status: RemoteStatus::Paused,
            objective: strategy.objective(),
            daily_budget: request.budget.daily_amount,
            currency: request.budget.currency.clone(),
            start_time: request.schedule.start_time,
            end_time: request.schedule.end_time,
            config: serde_json::to_value(request)?,
            created_at: Utc::now(),
        };

        let campaign = self
            .store
            .insert(&row)
            .await
            .map_err(|source| CampaignError::Persistence {
                meta_ids: meta_ids.clone(),
                source,
            })?;
        attempt.mark_persisted()?;

        Ok(CreationResult {
            message: CREATED_MESSAGE.to_string(),
            campaign,
            meta_ids,
        })
    }

    /// Run one remote create call under the per-call timeout. No retries:
    /// a repeated create would leave a duplicate object behind.
    async fn call<F>(&self, step: CreationStage, call: F) -> CampaignResult<RemoteObject>
    where
        F: Future<Output = Result<RemoteObject, AdPlatformError>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AdPlatformError::Timeout(self.call_timeout.as_millis() as u64)),
        };
        metrics::histogram!("meta.remote_call.latency_ms", "step" => step.as_str())
            .record(start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(object) => {
                debug!(step = %step, remote_id = %object.id, "Remote object created");
                Ok(object)
            }
            Err(source) => Err(CampaignError::RemoteCall { step, source }),
        }
    }
}

fn report_failure(
    attempt: &CreationAttempt,
    failed_step: Option<CreationStage>,
    caller: &Caller,
    request: &CampaignRequest,
    err: &CampaignError,
) {
    let furthest = attempt.furthest();
    metrics::counter!("meta.campaigns.failed", "stage" => furthest.as_str()).increment(1);

    let orphaned = attempt.record().created_objects();
    let orphaned_ids = orphaned
        .iter()
        .map(|(kind, id)| format!("{kind}={id}"))
        .collect::<Vec<_>>()
        .join(",");

    if let CampaignError::Persistence { meta_ids, .. } = err {
        error!(
            user_id = %caller.user_id,
            promotion_type = %request.promotion_type,
            campaign_id = %meta_ids.campaign_id,
            ad_id = %meta_ids.ad_id,
            error = %err,
            "Campaign exists on Meta but was not recorded locally"
        );
    } else {
        warn!(
            user_id = %caller.user_id,
            promotion_type = %request.promotion_type,
            furthest_stage = %furthest,
            failed_step = failed_step.map_or("none", |step| step.as_str()),
            error_code = err.code(),
            error = %err,
            "Campaign creation failed"
        );
    }

    if !orphaned.is_empty() {
        metrics::counter!("meta.orphaned_objects").increment(orphaned.len() as u64);
        // TODO: compensating deletes keyed by `furthest` once the client exposes delete calls.
        warn!(
            furthest_stage = %furthest,
            orphaned = %orphaned_ids,
            "Remote objects left behind without rollback"
        );
    }
}
