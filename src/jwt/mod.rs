//! JWT token handling

use crate::config::JwtConfig;
use crate::domain::Principal;
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience of identity (access) tokens
pub const IDENTITY_AUDIENCE: &str = "catcheat";
/// Audience of OAuth2 `state` tokens
pub const OAUTH2_STATE_AUDIENCE: &str = "catcheat-oauth2-state";
/// Lifetime of an OAuth2 `state` token
pub const OAUTH2_STATE_TTL_SECS: i64 = 600;

/// Identity token claims (issued after local or social login)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    pub name: String,
    /// `LOCAL` or the OAuth2 registration id
    pub provider: String,
    pub iss: String,
    pub aud: String,
    /// Token type discriminator (prevents token confusion attacks)
    #[serde(default)]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl IdentityClaims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// OAuth2 `state` claims, bound to one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2StateClaims {
    /// Random nonce
    pub sub: String,
    pub provider: String,
    pub iss: String,
    pub aud: String,
    #[serde(default)]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// JWT token manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Validation with a 5 second leeway instead of the default 60
    fn strict_validation(&self, audience: &str) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 5;
        v.set_audience(&[audience]);
        v.set_issuer(&[&self.config.issuer]);
        v
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl(&self) -> i64 {
        self.config.access_token_ttl_secs
    }

    /// Create an identity token for an authenticated principal
    pub fn create_identity_token(&self, principal: &Principal) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_ttl_secs);

        let claims = IdentityClaims {
            sub: principal.user_id.to_string(),
            email: principal.email.clone(),
            name: principal.display_name.clone(),
            provider: principal.provider.to_string(),
            iss: self.config.issuer.clone(),
            aud: IDENTITY_AUDIENCE.to_string(),
            token_type: "identity".to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// Verify and decode an identity token
    pub fn verify_identity_token(&self, token: &str) -> Result<IdentityClaims> {
        let validation = self.strict_validation(IDENTITY_AUDIENCE);
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &validation)?;

        if token_data.claims.token_type != "identity" {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }
        Ok(token_data.claims)
    }

    /// Create a short-lived `state` token for an OAuth2 authorization request
    pub fn create_oauth2_state(&self, provider: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(OAUTH2_STATE_TTL_SECS);

        let claims = OAuth2StateClaims {
            sub: Uuid::new_v4().to_string(),
            provider: provider.to_lowercase(),
            iss: self.config.issuer.clone(),
            aud: OAUTH2_STATE_AUDIENCE.to_string(),
            token_type: "oauth2_state".to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// Verify a `state` token and check it was issued for `provider`
    pub fn verify_oauth2_state(&self, state: &str, provider: &str) -> Result<OAuth2StateClaims> {
        let validation = self.strict_validation(OAUTH2_STATE_AUDIENCE);
        let claims = decode::<OAuth2StateClaims>(state, &self.decoding_key, &validation)
            .map_err(|_| AppError::BadRequest("Invalid or expired OAuth2 state".to_string()))?
            .claims;

        if claims.token_type != "oauth2_state" || !claims.provider.eq_ignore_ascii_case(provider) {
            return Err(AppError::BadRequest(
                "OAuth2 state does not match provider".to_string(),
            ));
        }
        Ok(claims)
    }
}
