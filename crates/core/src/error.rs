use crate::types::{CreationStage, MetaIds, PromotionType};
use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Unsupported promotion type: {0}")]
    UnsupportedPromotionType(PromotionType),

    #[error("Validation error: {0}")]
    Validation(String),

    /// `step` is the stage the attempt was trying to reach.
    #[error("{step} failed: {source}")]
    RemoteCall {
        step: CreationStage,
        #[source]
        source: AdPlatformError,
    },

    /// All four remote objects exist but no local record was written.
    #[error("Persistence error after remote creation (campaign {}): {source}", .meta_ids.campaign_id)]
    Persistence {
        meta_ids: MetaIds,
        #[source]
        source: StoreError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    /// Stable machine-readable code for API responses and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            CampaignError::UnsupportedPromotionType(_) => "unsupported_promotion_type",
            CampaignError::Validation(_) => "validation_error",
            CampaignError::RemoteCall { .. } => "remote_call_failed",
            CampaignError::Persistence { .. } => "persistence_failed",
            CampaignError::Config(_) => "config_error",
            CampaignError::Serialization(_) => "serialization_error",
            CampaignError::Internal(_) => "internal_error",
        }
    }
}

/// Failure of a single ad-platform call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdPlatformError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("platform rejected request (HTTP {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        fbtrace_id: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Failure of the campaign persistence store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected write (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected store response: {0}")]
    Decode(String),
}
