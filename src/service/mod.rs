//! Business logic layer

pub mod auth;
pub mod store;

pub use auth::AuthService;
pub use store::StoreService;
