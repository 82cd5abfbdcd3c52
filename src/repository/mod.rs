//! Data access layer (Repository pattern)

pub mod store;
pub mod user;

pub use store::{StoreRepository, StoreRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};
