//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod envelope;
pub mod error;
pub mod health_api;
pub mod middleware;
pub mod rate_limit;
pub mod tsid;

// Re-export commonly used items
pub use envelope::BaseResponse;
pub use error::{PlatformError, Result};
pub use health_api::health_router;
pub use middleware::{AppState, Authenticated, AuthLayer, CurrentUser};
pub use rate_limit::RateLimitLayer;
pub use tsid::TsidGenerator;
