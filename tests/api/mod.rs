//! API integration tests infrastructure
//!
//! This module provides in-memory repositories and a scripted OAuth2 client
//! so handlers can be tested without a database or provider.

pub mod http;

use async_trait::async_trait;
use catcheat_core::config::{JwtConfig, OAuth2ProviderConfig};
use catcheat_core::domain::{AuthProvider, CreateUserInput, Principal, Store, User};
use catcheat_core::error::{AppError, Result};
use catcheat_core::jwt::JwtManager;
use catcheat_core::oauth2::{OAuth2Client, OAuth2UserInfo};
use catcheat_core::repository::{StoreRepository, UserRepository};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

// ============================================================================
// Test Configuration
// ============================================================================

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-api-testing-purposes".to_string(),
        issuer: "https://catcheat.test".to_string(),
        access_token_ttl_secs: 3600,
    }
}

pub fn create_test_jwt_manager() -> JwtManager {
    JwtManager::new(test_jwt_config())
}

/// Create an identity token for a local user
pub fn create_test_identity_token(user_id: i64, email: &str) -> String {
    create_test_jwt_manager()
        .create_identity_token(&Principal {
            user_id,
            email: Some(email.to_string()),
            display_name: email.to_string(),
            provider: AuthProvider::Local,
            subject: None,
        })
        .expect("Failed to create test identity token")
}

/// A provider registration pointing at unreachable endpoints
pub fn test_provider_config(registration_id: &str) -> OAuth2ProviderConfig {
    OAuth2ProviderConfig {
        registration_id: registration_id.to_string(),
        client_id: format!("{}-client", registration_id),
        client_secret: "secret".to_string(),
        redirect_uri: format!(
            "http://localhost:8080/auth/oauth2/{}/callback",
            registration_id
        ),
        authorize_url: format!("https://{}.test/oauth/authorize", registration_id),
        token_url: format!("https://{}.test/oauth/token", registration_id),
        userinfo_url: format!("https://{}.test/userinfo", registration_id),
        scope: "openid email profile".to_string(),
    }
}

// ============================================================================
// Test Repositories
// ============================================================================

/// In-memory store repository with auto-increment ids
pub struct TestStoreRepository {
    stores: RwLock<Vec<Store>>,
    next_id: RwLock<i64>,
}

impl TestStoreRepository {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(vec![]),
            next_id: RwLock::new(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.stores.read().await.len()
    }
}

impl Default for TestStoreRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreRepository for TestStoreRepository {
    async fn save(&self, store: &Store) -> Result<Store> {
        let mut stores = self.stores.write().await;
        match store.id {
            Some(id) => {
                let saved = store.clone();
                match stores.iter_mut().find(|s| s.id == Some(id)) {
                    Some(existing) => *existing = saved.clone(),
                    None => stores.push(saved.clone()),
                }
                Ok(saved)
            }
            None => {
                let mut next_id = self.next_id.write().await;
                let saved = Store {
                    id: Some(*next_id),
                    ..store.clone()
                };
                *next_id += 1;
                stores.push(saved.clone());
                Ok(saved)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Store>> {
        let stores = self.stores.read().await;
        Ok(stores.iter().find(|s| s.id == Some(id)).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Store>> {
        Ok(self.stores.read().await.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.stores.write().await.retain(|s| s.id != Some(id));
        Ok(())
    }
}

/// In-memory user repository enforcing the unique email index
pub struct TestUserRepository {
    users: RwLock<Vec<User>>,
}

impl TestUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(vec![]),
        }
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.read().await.clone()
    }
}

impl Default for TestUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for TestUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let mut users = self.users.write().await;
        if input.email.is_some() && users.iter().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            user_id: users.len() as i64 + 1,
            provider: input.provider.clone(),
            provider_id: input.provider_id.clone(),
            email: input.email.clone(),
            password: input.password_hash.clone(),
            nickname: input.nickname.clone(),
            profile_image_url: input.profile_image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| &u.provider == provider && u.provider_id.as_deref() == Some(provider_id))
            .cloned())
    }
}

// ============================================================================
// Scripted OAuth2 client
// ============================================================================

/// Maps authorization codes to the user info the "provider" returns
pub struct TestOAuth2Client {
    responses: RwLock<HashMap<String, OAuth2UserInfo>>,
}

impl TestOAuth2Client {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_code(&self, code: &str, user_info: OAuth2UserInfo) {
        self.responses
            .write()
            .await
            .insert(code.to_string(), user_info);
    }
}

impl Default for TestOAuth2Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuth2Client for TestOAuth2Client {
    async fn fetch_user_info(
        &self,
        provider: &OAuth2ProviderConfig,
        code: &str,
    ) -> Result<OAuth2UserInfo> {
        self.responses
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| {
                AppError::OAuth2(format!(
                    "{} token endpoint rejected the code",
                    provider.registration_id
                ))
            })
    }
}
