//! User and authentication domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored value for locally registered accounts
pub const LOCAL_PROVIDER: &str = "LOCAL";

/// Where an account's credentials live.
///
/// Persisted as `LOCAL` or as the lowercase OAuth2 registration id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AuthProvider {
    #[default]
    Local,
    OAuth2 { provider: String },
}

impl AuthProvider {
    pub fn oauth2(provider: impl Into<String>) -> Self {
        AuthProvider::OAuth2 {
            provider: provider.into().to_lowercase(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, AuthProvider::Local)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthProvider::Local => LOCAL_PROVIDER,
            AuthProvider::OAuth2 { provider } => provider,
        }
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Auth provider cannot be empty".to_string());
        }
        if s.eq_ignore_ascii_case(LOCAL_PROVIDER) {
            Ok(AuthProvider::Local)
        } else {
            Ok(AuthProvider::oauth2(s))
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AuthProvider> for String {
    fn from(provider: AuthProvider) -> Self {
        provider.to_string()
    }
}

impl TryFrom<String> for AuthProvider {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for AuthProvider {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for AuthProvider {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for AuthProvider {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// User entity (`user_info` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: i64,
    #[schema(value_type = String)]
    pub provider: AuthProvider,
    /// External subject for OAuth2 accounts
    pub provider_id: Option<String>,
    pub email: Option<String>,
    /// Argon2 PHC string; local accounts only
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name: nickname, falling back to the email
    pub fn display_name(&self) -> String {
        self.nickname
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_default()
    }
}

/// Input for inserting a user row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateUserInput {
    pub provider: AuthProvider,
    pub provider_id: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Local signup payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub nickname: Option<String>,
}

/// Local login payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub email: Option<String>,
    pub user_name: String,
    pub provider: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            user_name: user.display_name(),
            provider: user.provider.to_string(),
        }
    }
}

/// Issued access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// An authenticated identity, local or social
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: i64,
    pub email: Option<String>,
    pub display_name: String,
    pub provider: AuthProvider,
    /// External subject (OAuth2 only)
    pub subject: Option<String>,
}

impl Principal {
    /// Principal name: the external subject for OAuth2 accounts, else the email
    pub fn name(&self) -> String {
        match (&self.provider, &self.subject) {
            (AuthProvider::OAuth2 { .. }, Some(subject)) => subject.clone(),
            _ => self.email.clone().unwrap_or_else(|| self.user_id.to_string()),
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            display_name: user.display_name(),
            provider: user.provider.clone(),
            subject: user.provider_id.clone(),
        }
    }
}
