//! HTTP middleware for CatchEat Core
//!
//! - JWT `AuthUser` extractor
//! - Authentication enforcement for route groups
//! - Request ID and metrics observability layer
//! - JSON normalization of framework error responses

pub mod auth;
pub mod error_response;
pub mod metrics;
pub mod require_auth;

pub use auth::{AuthError, AuthUser};
pub use error_response::normalize_error_response;
pub use metrics::ObservabilityLayer;
pub use require_auth::{
    require_auth_middleware, store_write_guard, AuthMiddlewareState, StoreWriteGuard,
};
