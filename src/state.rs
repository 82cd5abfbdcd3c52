//! Application state traits for dependency injection
//!
//! Handlers are generic over `HasServices`, so the same code runs against the
//! production `AppState` and the in-memory state used by HTTP tests.

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::oauth2::OAuth2Client;
use crate::repository::{StoreRepository, UserRepository};
use crate::service::{AuthService, StoreService};

/// Trait for application state that provides access to all services.
pub trait HasServices: Clone + Send + Sync + 'static {
    /// The store repository type
    type StoreRepo: StoreRepository;
    /// The user repository type
    type UserRepo: UserRepository;
    /// The OAuth2 provider client type
    type OAuth2: OAuth2Client;

    /// Get the application configuration
    fn config(&self) -> &Config;

    /// Get the store service
    fn store_service(&self) -> &StoreService<Self::StoreRepo>;

    /// Get the authentication service
    fn auth_service(&self) -> &AuthService<Self::UserRepo>;

    /// Get the OAuth2 provider client
    fn oauth2_client(&self) -> &Self::OAuth2;

    /// Get the JWT manager
    fn jwt_manager(&self) -> &JwtManager;

    /// Check whether the database is reachable
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
