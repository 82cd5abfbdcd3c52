//! Local and social authentication

use crate::domain::{
    AuthProvider, CreateUserInput, LoginInput, Principal, SignupInput, TokenResponse, User,
    UserDto,
};
use crate::error::{AppError, Result};
use crate::jwt::JwtManager;
use crate::oauth2::OAuth2UserInfo;
use crate::repository::UserRepository;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    jwt_manager: JwtManager,
}

fn record_login(provider: &AuthProvider, result: &'static str) {
    metrics::counter!(
        "catcheat_auth_login_total",
        "provider" => provider.to_string(),
        "result" => result
    )
    .increment(1);
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: Arc<U>, jwt_manager: JwtManager) -> Self {
        Self {
            user_repo,
            jwt_manager,
        }
    }

    /// Resolve a local principal by email
    pub async fn load_user_by_username(&self, email: &str) -> Result<Principal> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with email: {}", email)))?;
        Ok(Principal::from(&user))
    }

    /// Register a local account
    pub async fn signup(&self, input: SignupInput) -> Result<UserDto> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "User with email '{}' already exists",
                input.email
            )));
        }

        let user = self
            .user_repo
            .create(&CreateUserInput {
                provider: AuthProvider::Local,
                provider_id: None,
                email: Some(input.email),
                password_hash: Some(hash_password(&input.password)?),
                nickname: input.nickname,
                profile_image_url: None,
            })
            .await?;

        info!(user_id = user.user_id, "Local user registered");
        Ok(UserDto::from(&user))
    }

    /// Check local credentials and issue an access token
    pub async fn login(&self, input: LoginInput) -> Result<TokenResponse> {
        input.validate()?;

        let user = match self.user_repo.find_by_email(&input.email).await? {
            Some(user) if user.provider.is_local() => user,
            _ => {
                record_login(&AuthProvider::Local, "failure");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let hash = user.password.as_deref().unwrap_or_default();
        if !verify_password(&input.password, hash)? {
            record_login(&AuthProvider::Local, "failure");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        record_login(&AuthProvider::Local, "success");
        self.issue_token(&Principal::from(&user))
    }

    /// Find or create the account behind a social login.
    ///
    /// Accounts are matched by email, or by provider subject when the provider
    /// shares no email. Existing accounts are never modified.
    pub async fn load_oauth2_user(
        &self,
        provider: &str,
        user_info: OAuth2UserInfo,
    ) -> Result<Principal> {
        let provider = AuthProvider::oauth2(provider);

        let existing = match user_info.email.as_deref() {
            Some(email) => self.user_repo.find_by_email(email).await?,
            None => {
                self.user_repo
                    .find_by_provider_id(&provider, &user_info.subject)
                    .await?
            }
        };

        let user = match existing {
            Some(user) => user,
            None => {
                let user = self
                    .user_repo
                    .create(&CreateUserInput {
                        provider: provider.clone(),
                        provider_id: Some(user_info.subject.clone()),
                        email: user_info.email.clone(),
                        password_hash: None,
                        nickname: user_info.name.clone(),
                        profile_image_url: user_info.picture.clone(),
                    })
                    .await?;
                info!(user_id = user.user_id, provider = %provider, "Social user registered");
                user
            }
        };

        if user.provider != provider {
            warn!(
                user_id = user.user_id,
                account_provider = %user.provider,
                login_provider = %provider,
                "Social login matched an account registered with another provider"
            );
        }

        record_login(&provider, "success");
        Ok(self.oauth2_principal(&user, &provider, user_info.subject))
    }

    fn oauth2_principal(&self, user: &User, provider: &AuthProvider, subject: String) -> Principal {
        Principal {
            provider: provider.clone(),
            subject: Some(subject),
            ..Principal::from(user)
        }
    }

    /// Issue an identity token for a principal
    pub fn issue_token(&self, principal: &Principal) -> Result<TokenResponse> {
        let token = self.jwt_manager.create_identity_token(principal)?;
        Ok(TokenResponse::bearer(
            token,
            self.jwt_manager.access_token_ttl(),
        ))
    }

    /// Profile of an authenticated user
    pub async fn get_profile(&self, user_id: i64) -> Result<UserDto> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        Ok(UserDto::from(&user))
    }
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its PHC hash; an unparsable hash never matches
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    use argon2::{PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(false),
    };

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
