//! Per-promotion-type campaign strategies.
//!
//! A strategy is a pure translation from the wizard's `CampaignRequest` into
//! Graph API payloads. The set is closed: `strategy_for` is the registry.

use campaign_core::types::*;
use campaign_core::{CampaignError, CampaignResult};
use serde_json::json;

/// Graph API budgets are integers in the currency's minor unit.
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Geo targeting used when the request does not specify `geo_locations`.
pub const DEFAULT_TARGET_COUNTRIES: &[&str] = &["US"];

/// Lead ads open an on-platform form, so the link is Meta's placeholder.
pub const LEAD_FORM_PLACEHOLDER_LINK: &str = "http://fb.me/";

/// Conversion event promoted by SALES ad sets. Not configurable yet.
pub const PURCHASE_EVENT: &str = "PURCHASE";

/// Capability shared by every promotion-type strategy.
pub trait CampaignStrategy: Send + Sync {
    fn promotion_type(&self) -> PromotionType;

    /// Objective of the parent campaign.
    fn objective(&self) -> MetaObjective;

    fn build_ad_set_payload(
        &self,
        request: &CampaignRequest,
        campaign_id: &str,
    ) -> CampaignResult<AdSetPayload>;

    fn build_creative_payload(
        &self,
        creative: &CreativeSpec,
        page_id: &str,
    ) -> CampaignResult<CreativePayload>;
}

/// Look up the strategy for a promotion type. `None` means the type has no
/// implementation yet and must be rejected before any remote call.
pub fn strategy_for(promotion_type: PromotionType) -> Option<&'static dyn CampaignStrategy> {
    match promotion_type {
        PromotionType::Awareness => Some(&AwarenessStrategy),
        PromotionType::Traffic => Some(&TrafficStrategy),
        PromotionType::LeadGeneration => Some(&LeadGenerationStrategy),
        PromotionType::Sales => Some(&SalesStrategy),
        PromotionType::Engagement
        | PromotionType::AppPromotion
        | PromotionType::LocalBusiness
        | PromotionType::Remarketing
        | PromotionType::OfferEvent => None,
    }
}

// ─── Shared payload pieces ──────────────────────────────────────────────────

/// Daily budget in minor units. Rejects amounts that round to zero or do
/// not fit the integer the Graph API expects.
pub fn to_minor_units(amount: f64) -> CampaignResult<u64> {
    let minor = (amount * MINOR_UNITS_PER_MAJOR).round();
    if !minor.is_finite() || minor < 1.0 || minor >= u64::MAX as f64 {
        return Err(CampaignError::Validation(format!(
            "budget.dailyAmount {amount} is not a valid daily budget"
        )));
    }
    Ok(minor as u64)
}

/// Request targeting merged key-by-key over the default geo block. Absent
/// (`null`) targeting keeps the default; any other non-object is rejected.
pub fn merge_targeting(requested: &serde_json::Value) -> CampaignResult<serde_json::Value> {
    let mut targeting = json!({
        "geo_locations": { "countries": DEFAULT_TARGET_COUNTRIES }
    });
    let overrides = match requested {
        serde_json::Value::Null => return Ok(targeting),
        serde_json::Value::Object(overrides) => overrides,
        other => {
            return Err(CampaignError::Validation(format!(
                "targeting must be a JSON object, got {other}"
            )))
        }
    };
    if let Some(base) = targeting.as_object_mut() {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    Ok(targeting)
}

fn base_ad_set(
    request: &CampaignRequest,
    campaign_id: &str,
    optimization_goal: OptimizationGoal,
) -> CampaignResult<AdSetPayload> {
    Ok(AdSetPayload {
        name: format!("{} - Ad Set", request.name),
        campaign_id: campaign_id.to_string(),
        daily_budget: to_minor_units(request.budget.daily_amount)?,
        billing_event: BillingEvent::Impressions,
        optimization_goal,
        bid_strategy: BidStrategy::LowestCostWithoutCap,
        start_time: request.schedule.start_time,
        end_time: request.schedule.end_time,
        targeting: merge_targeting(&request.targeting)?,
        status: RemoteStatus::Paused,
        promoted_object: None,
    })
}

fn required<'a>(value: Option<&'a str>, what: &str) -> CampaignResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CampaignError::Validation(format!("{what} is required"))),
    }
}

fn link_creative(
    creative: &CreativeSpec,
    page_id: &str,
    link: &str,
    call_to_action: CallToAction,
) -> CreativePayload {
    let label = creative.headline.as_deref().unwrap_or(&creative.text);
    CreativePayload {
        name: format!("Creative - {label}"),
        object_story_spec: ObjectStorySpec {
            page_id: page_id.to_string(),
            link_data: LinkData {
                message: creative.text.clone(),
                link: link.to_string(),
                name: creative.headline.clone(),
                image_hash: creative.image_ref.clone(),
                call_to_action,
            },
        },
    }
}

/// Link ad whose button points at the destination URL.
fn destination_creative(
    creative: &CreativeSpec,
    page_id: &str,
    cta_type: CallToActionType,
    promotion: &str,
) -> CampaignResult<CreativePayload> {
    let link = required(
        creative.destination_url.as_deref(),
        &format!("creative.destinationUrl for {promotion} campaigns"),
    )?;
    let cta = CallToAction {
        cta_type,
        value: Some(CallToActionValue {
            link: Some(link.to_string()),
            lead_gen_form_id: None,
        }),
    };
    Ok(link_creative(creative, page_id, link, cta))
}

// ─── Awareness ──────────────────────────────────────────────────────────────

pub struct AwarenessStrategy;

impl CampaignStrategy for AwarenessStrategy {
    fn promotion_type(&self) -> PromotionType {
        PromotionType::Awareness
    }

    fn objective(&self) -> MetaObjective {
        MetaObjective::OutcomeAwareness
    }

    fn build_ad_set_payload(
        &self,
        request: &CampaignRequest,
        campaign_id: &str,
    ) -> CampaignResult<AdSetPayload> {
        base_ad_set(request, campaign_id, OptimizationGoal::Reach)
    }

    fn build_creative_payload(
        &self,
        creative: &CreativeSpec,
        page_id: &str,
    ) -> CampaignResult<CreativePayload> {
        let cta = creative.cta_type.unwrap_or(CallToActionType::LearnMore);
        destination_creative(creative, page_id, cta, "AWARENESS")
    }
}

// ─── Traffic ────────────────────────────────────────────────────────────────

pub struct TrafficStrategy;

impl CampaignStrategy for TrafficStrategy {
    fn promotion_type(&self) -> PromotionType {
        PromotionType::Traffic
    }

    fn objective(&self) -> MetaObjective {
        MetaObjective::OutcomeTraffic
    }

    fn build_ad_set_payload(
        &self,
        request: &CampaignRequest,
        campaign_id: &str,
    ) -> CampaignResult<AdSetPayload> {
        base_ad_set(request, campaign_id, OptimizationGoal::LinkClicks)
    }

    fn build_creative_payload(
        &self,
        creative: &CreativeSpec,
        page_id: &str,
    ) -> CampaignResult<CreativePayload> {
        let cta = creative.cta_type.unwrap_or(CallToActionType::LearnMore);
        destination_creative(creative, page_id, cta, "TRAFFIC")
    }
}

// ─── Lead Generation ────────────────────────────────────────────────────────

pub struct LeadGenerationStrategy;

impl CampaignStrategy for LeadGenerationStrategy {
    fn promotion_type(&self) -> PromotionType {
        PromotionType::LeadGeneration
    }

    fn objective(&self) -> MetaObjective {
        MetaObjective::OutcomeLeads
    }

    fn build_ad_set_payload(
        &self,
        request: &CampaignRequest,
        campaign_id: &str,
    ) -> CampaignResult<AdSetPayload> {
        base_ad_set(request, campaign_id, OptimizationGoal::Leads)
    }

    fn build_creative_payload(
        &self,
        creative: &CreativeSpec,
        page_id: &str,
    ) -> CampaignResult<CreativePayload> {
        let form_id = required(
            creative.lead_form_id.as_deref(),
            "creative.leadFormId for LEAD_GENERATION campaigns",
        )?;
        let cta = CallToAction {
            cta_type: CallToActionType::SignUp,
            value: Some(CallToActionValue {
                link: None,
                lead_gen_form_id: Some(form_id.to_string()),
            }),
        };
        Ok(link_creative(creative, page_id, LEAD_FORM_PLACEHOLDER_LINK, cta))
    }
}

// ─── Sales ──────────────────────────────────────────────────────────────────

pub struct SalesStrategy;

impl CampaignStrategy for SalesStrategy {
    fn promotion_type(&self) -> PromotionType {
        PromotionType::Sales
    }

    fn objective(&self) -> MetaObjective {
        MetaObjective::OutcomeSales
    }

    fn build_ad_set_payload(
        &self,
        request: &CampaignRequest,
        campaign_id: &str,
    ) -> CampaignResult<AdSetPayload> {
        let pixel_id = required(request.pixel_id.as_deref(), "pixelId for SALES campaigns")?;
        let mut payload = base_ad_set(request, campaign_id, OptimizationGoal::OffsiteConversions)?;
        payload.promoted_object = Some(PromotedObject {
            pixel_id: pixel_id.to_string(),
            custom_event_type: PURCHASE_EVENT.to_string(),
        });
        Ok(payload)
    }

    fn build_creative_payload(
        &self,
        creative: &CreativeSpec,
        page_id: &str,
    ) -> CampaignResult<CreativePayload> {
        destination_creative(creative, page_id, CallToActionType::ShopNow, "SALES")
    }
}
