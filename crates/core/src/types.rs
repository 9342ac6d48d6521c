//! Meta campaign domain types: caller requests, ad-platform payloads and
//! persisted campaign rows.
//!
//! Request types use camelCase on the wire (they come from the web wizard);
//! payload types use the Graph API's own snake_case field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ─── Promotion Types ────────────────────────────────────────────────────────

/// Caller-facing campaign category. Each one maps to at most one strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionType {
    Awareness,
    Traffic,
    LeadGeneration,
    Sales,
    Engagement,
    AppPromotion,
    LocalBusiness,
    Remarketing,
    OfferEvent,
}

impl PromotionType {
    pub const ALL: [PromotionType; 9] = [
        PromotionType::Awareness,
        PromotionType::Traffic,
        PromotionType::LeadGeneration,
        PromotionType::Sales,
        PromotionType::Engagement,
        PromotionType::AppPromotion,
        PromotionType::LocalBusiness,
        PromotionType::Remarketing,
        PromotionType::OfferEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionType::Awareness => "AWARENESS",
            PromotionType::Traffic => "TRAFFIC",
            PromotionType::LeadGeneration => "LEAD_GENERATION",
            PromotionType::Sales => "SALES",
            PromotionType::Engagement => "ENGAGEMENT",
            PromotionType::AppPromotion => "APP_PROMOTION",
            PromotionType::LocalBusiness => "LOCAL_BUSINESS",
            PromotionType::Remarketing => "REMARKETING",
            PromotionType::OfferEvent => "OFFER_EVENT",
        }
    }
}

impl fmt::Display for PromotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign-level objective on the Meta side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetaObjective {
    OutcomeAwareness,
    OutcomeTraffic,
    OutcomeLeads,
    OutcomeSales,
    OutcomeEngagement,
    OutcomeAppPromotion,
}

impl MetaObjective {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaObjective::OutcomeAwareness => "OUTCOME_AWARENESS",
            MetaObjective::OutcomeTraffic => "OUTCOME_TRAFFIC",
            MetaObjective::OutcomeLeads => "OUTCOME_LEADS",
            MetaObjective::OutcomeSales => "OUTCOME_SALES",
            MetaObjective::OutcomeEngagement => "OUTCOME_ENGAGEMENT",
            MetaObjective::OutcomeAppPromotion => "OUTCOME_APP_PROMOTION",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationGoal {
    Reach,
    LinkClicks,
    Leads,
    OffsiteConversions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingEvent {
    Impressions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStrategy {
    LowestCostWithoutCap,
}

/// Delivery status of a remote object. Everything this service creates
/// starts out `Paused`; activation happens in Ads Manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStatus {
    Paused,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallToActionType {
    LearnMore,
    SignUp,
    ShopNow,
    ContactUs,
    Subscribe,
    GetOffer,
    Download,
}

// ─── Caller Request ─────────────────────────────────────────────────────────

/// The authenticated caller on whose behalf a campaign is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Generic campaign form as submitted by the campaign wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    pub promotion_type: PromotionType,
    pub ad_account_id: String,
    pub page_id: String,
    pub name: String,
    pub creative: CreativeSpec,
    pub budget: Budget,
    pub schedule: Schedule,
    /// Free-form geo/demographic targeting, forwarded as-is.
    #[serde(default)]
    pub targeting: serde_json::Value,
    /// Conversion pixel; only SALES campaigns need one.
    #[serde(default)]
    pub pixel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeSpec {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub destination_url: Option<String>,
    /// Image hash of an asset already uploaded to the ad account.
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub cta_type: Option<CallToActionType>,
    #[serde(default)]
    pub lead_form_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Daily spend in major currency units (e.g. dollars).
    pub daily_amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub start_time: DateTime<Utc>,
    /// `None` runs the ad set open-ended.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

// ─── Ad-Platform Payloads ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignPayload {
    pub name: String,
    pub objective: MetaObjective,
    pub status: RemoteStatus,
    pub special_ad_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdSetPayload {
    pub name: String,
    pub campaign_id: String,
    /// Minor currency units (cents).
    pub daily_budget: u64,
    pub billing_event: BillingEvent,
    pub optimization_goal: OptimizationGoal,
    pub bid_strategy: BidStrategy,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub targeting: serde_json::Value,
    pub status: RemoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_object: Option<PromotedObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotedObject {
    pub pixel_id: String,
    pub custom_event_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreativePayload {
    pub name: String,
    pub object_story_spec: ObjectStorySpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectStorySpec {
    pub page_id: String,
    pub link_data: LinkData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkData {
    pub message: String,
    pub link: String,
    /// Headline shown under the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    pub call_to_action: CallToAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToAction {
    #[serde(rename = "type")]
    pub cta_type: CallToActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CallToActionValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallToActionValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_gen_form_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdPayload {
    pub name: String,
    pub adset_id: String,
    pub creative: AdCreativeRef,
    pub status: RemoteStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdCreativeRef {
    pub creative_id: String,
}

/// Body of every successful Graph API create call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
}

// ─── Creation Lifecycle ─────────────────────────────────────────────────────

/// Progress of a single creation attempt. `Failed` is terminal and reachable
/// from any non-terminal stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreationStage {
    Start,
    CampaignCreated,
    #[serde(rename = "ADSET_CREATED")]
    AdSetCreated,
    CreativeCreated,
    AdCreated,
    Persisted,
    Failed,
}

impl CreationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationStage::Start => "START",
            CreationStage::CampaignCreated => "CAMPAIGN_CREATED",
            CreationStage::AdSetCreated => "ADSET_CREATED",
            CreationStage::CreativeCreated => "CREATIVE_CREATED",
            CreationStage::AdCreated => "AD_CREATED",
            CreationStage::Persisted => "PERSISTED",
            CreationStage::Failed => "FAILED",
        }
    }

    /// The stage that follows on success, if any.
    pub fn next(&self) -> Option<CreationStage> {
        match self {
            CreationStage::Start => Some(CreationStage::CampaignCreated),
            CreationStage::CampaignCreated => Some(CreationStage::AdSetCreated),
            CreationStage::AdSetCreated => Some(CreationStage::CreativeCreated),
            CreationStage::CreativeCreated => Some(CreationStage::AdCreated),
            CreationStage::AdCreated => Some(CreationStage::Persisted),
            CreationStage::Persisted | CreationStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CreationStage::Persisted | CreationStage::Failed)
    }
}

impl fmt::Display for CreationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Persisted Campaign ─────────────────────────────────────────────────────

/// The four remote ids produced by one successful creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaIds {
    pub campaign_id: String,
    pub ad_set_id: String,
    pub creative_id: String,
    pub ad_id: String,
}

/// One row of the `campaigns` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedCampaign {
    pub id: Uuid,
    pub user_id: String,
    pub meta_campaign_id: String,
    pub meta_ad_set_id: String,
    pub meta_creative_id: String,
    pub meta_ad_id: String,
    pub name: String,
    pub promotion_type: PromotionType,
    pub status: RemoteStatus,
    pub objective: MetaObjective,
    pub daily_budget: f64,
    pub currency: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// The original request, kept verbatim.
    pub config: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl PersistedCampaign {
    pub fn meta_ids(&self) -> MetaIds {
        MetaIds {
            campaign_id: self.meta_campaign_id.clone(),
            ad_set_id: self.meta_ad_set_id.clone(),
            creative_id: self.meta_creative_id.clone(),
            ad_id: self.meta_ad_id.clone(),
        }
    }
}

/// What the factory hands back to its caller after a successful creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationResult {
    pub message: String,
    pub campaign: PersistedCampaign,
    pub meta_ids: MetaIds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_type_wire_names() {
        for pt in PromotionType::ALL {
            let json = serde_json::to_string(&pt).unwrap();
            assert_eq!(json, format!("\"{}\"", pt.as_str()));
        }
    }

    #[test]
    fn test_stage_wire_name_matches_display() {
        let json = serde_json::to_string(&CreationStage::AdSetCreated).unwrap();
        assert_eq!(json, "\"ADSET_CREATED\"");
        assert_eq!(CreationStage::AdSetCreated.to_string(), "ADSET_CREATED");
    }

    #[test]
    fn test_stage_chain_ends_at_persisted() {
        let mut stage = CreationStage::Start;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(stage, CreationStage::Persisted);
        assert_eq!(visited.len(), 6);
        assert!(CreationStage::Failed.next().is_none());
    }

    #[test]
    fn test_request_from_wizard_json() {
        let req: CampaignRequest = serde_json::from_value(serde_json::json!({
            "promotionType": "TRAFFIC",
            "name": "Fall Sale",
            "adAccountId": "act_1",
            "pageId": "page_1",
            "creative": {"text": "Buy now", "destinationUrl": "https://x.test", "imageRef": "img_1"},
            "budget": {"dailyAmount": 25, "currency": "USD"},
            "schedule": {"startTime": "2025-01-01T00:00:00Z"},
            "targeting": {}
        }))
        .unwrap();

        assert_eq!(req.promotion_type, PromotionType::Traffic);
        assert_eq!(req.budget.daily_amount, 25.0);
        assert!(req.schedule.end_time.is_none());
        assert!(req.pixel_id.is_none());
        assert_eq!(req.creative.image_ref.as_deref(), Some("img_1"));
    }

    #[test]
    fn test_ad_set_payload_omits_absent_optionals() {
        let payload = AdSetPayload {
            name: "x".into(),
            campaign_id: "c1".into(),
            daily_budget: 1000,
            billing_event: BillingEvent::Impressions,
            optimization_goal: OptimizationGoal::LinkClicks,
            bid_strategy: BidStrategy::LowestCostWithoutCap,
            start_time: Utc::now(),
            end_time: None,
            targeting: serde_json::json!({}),
            status: RemoteStatus::Paused,
            promoted_object: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("end_time").is_none());
        assert!(json.get("promoted_object").is_none());
        assert_eq!(json["status"], "PAUSED");
        assert_eq!(json["optimization_goal"], "LINK_CLICKS");
    }
}
