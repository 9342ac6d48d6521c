//! Meta ad campaign creation: per-promotion-type strategies, the Graph API
//! client and the factory that sequences campaign, ad set, creative and ad.

pub mod attempt;
pub mod clients;
pub mod factory;
pub mod recording;
pub mod strategies;

pub use clients::{AdPlatformClient, MetaGraphClient};
pub use factory::CampaignFactory;
pub use recording::RecordingAdClient;
pub use strategies::{strategy_for, CampaignStrategy};
