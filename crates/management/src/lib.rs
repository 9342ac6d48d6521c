//! Campaign builder HTTP backend: create and browse Meta campaigns.
//!
//! Caller identity comes from the `x-user-id` header set by the upstream
//! gateway; this crate does no authentication of its own.

pub mod handlers;
pub mod models;
pub mod router;
pub mod server;

pub use handlers::ManagementState;
pub use router::management_router;
pub use server::ApiServer;
