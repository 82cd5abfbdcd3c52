//! OAuth2 social login: provider client and user-info normalization

use crate::config::OAuth2ProviderConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Normalized user info returned by a provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OAuth2UserInfo {
    /// Provider-side subject (`sub` for OIDC, `id` for Kakao)
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// True only when the flag is present and false; some providers send `"false"`
fn flagged_false(value: &Value, pointer: &str) -> bool {
    match value.pointer(pointer) {
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}

impl OAuth2UserInfo {
    /// Normalize a provider's user-info document.
    ///
    /// Accepts standard OIDC claims (`sub`, `email`, `name`, `picture`) and the
    /// Kakao shape (`id`, `kakao_account.email`, `kakao_account.profile.*`).
    /// An email the provider flags as unverified is dropped, so the account is
    /// matched by subject instead.
    pub fn from_attributes(attributes: &Value) -> Result<Self> {
        let subject = match (attributes.get("sub"), attributes.get("id")) {
            (Some(Value::String(sub)), _) if !sub.is_empty() => sub.clone(),
            (_, Some(Value::Number(id))) => id.to_string(),
            (_, Some(Value::String(id))) if !id.is_empty() => id.clone(),
            _ => {
                return Err(AppError::OAuth2(
                    "User info response has no subject".to_string(),
                ))
            }
        };

        let email = str_at(attributes, "/email")
            .filter(|_| !flagged_false(attributes, "/email_verified"))
            .or_else(|| {
                str_at(attributes, "/kakao_account/email").filter(|_| {
                    !flagged_false(attributes, "/kakao_account/is_email_verified")
                        && !flagged_false(attributes, "/kakao_account/is_email_valid")
                })
            });
        let name = str_at(attributes, "/name")
            .or_else(|| str_at(attributes, "/kakao_account/profile/nickname"))
            .or_else(|| str_at(attributes, "/properties/nickname"));
        let picture = str_at(attributes, "/picture")
            .or_else(|| str_at(attributes, "/kakao_account/profile/profile_image_url"))
            .or_else(|| str_at(attributes, "/properties/profile_image"));

        Ok(Self {
            subject,
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            picture: picture.map(str::to_string),
        })
    }
}

/// Build the provider's authorization redirect URL
pub fn build_authorize_url(provider: &OAuth2ProviderConfig, state: &str) -> Result<String> {
    let mut url = Url::parse(&provider.authorize_url).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Invalid authorize URL for '{}': {}",
            provider.registration_id,
            e
        ))
    })?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &provider.client_id)
        .append_pair("redirect_uri", &provider.redirect_uri)
        .append_pair("scope", &provider.scope)
        .append_pair("state", state);

    Ok(url.to_string())
}

/// Port to an OAuth2 provider: code exchange followed by a user-info fetch
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuth2Client: Send + Sync {
    async fn fetch_user_info(
        &self,
        provider: &OAuth2ProviderConfig,
        code: &str,
    ) -> Result<OAuth2UserInfo>;
}

#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    access_token: String,
}

/// reqwest-backed provider client
#[derive(Clone)]
pub struct HttpOAuth2Client {
    http_client: reqwest::Client,
}

impl HttpOAuth2Client {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self { http_client })
    }

    async fn exchange_code(&self, provider: &OAuth2ProviderConfig, code: &str) -> Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", provider.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(&provider.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::OAuth2(format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth2(format!(
                "Failed to exchange code: {} - {}",
                status, body
            )));
        }

        let token: ProviderTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuth2(format!("Failed to parse token response: {}", e)))?;

        Ok(token.access_token)
    }

    async fn fetch_attributes(
        &self,
        provider: &OAuth2ProviderConfig,
        access_token: &str,
    ) -> Result<Value> {
        tracing::debug!(
            provider = %provider.registration_id,
            "Fetching userinfo from {}",
            provider.userinfo_url
        );

        let response = self
            .http_client
            .get(&provider.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuth2(format!("Failed to fetch userinfo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth2(format!(
                "Failed to fetch userinfo: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuth2(format!("Failed to parse userinfo: {}", e)))
    }
}

#[async_trait]
impl OAuth2Client for HttpOAuth2Client {
    async fn fetch_user_info(
        &self,
        provider: &OAuth2ProviderConfig,
        code: &str,
    ) -> Result<OAuth2UserInfo> {
        let access_token = self.exchange_code(provider, code).await?;
        let attributes = self.fetch_attributes(provider, &access_token).await?;
        OAuth2UserInfo::from_attributes(&attributes)
    }
}
