//! Configuration management for CatchEat Core

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// OAuth2 social login providers
    pub oauth2: OAuth2Config,
    /// Route protection settings
    pub security: SecurityConfig,
    /// Logging and metrics settings
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

/// Registered OAuth2 providers, keyed by registration id (e.g. `google`)
#[derive(Debug, Clone, Default)]
pub struct OAuth2Config {
    pub providers: HashMap<String, OAuth2ProviderConfig>,
}

impl OAuth2Config {
    pub fn provider(&self, registration_id: &str) -> Option<&OAuth2ProviderConfig> {
        self.providers.get(&registration_id.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct OAuth2ProviderConfig {
    /// Registration id, always lowercase
    pub registration_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scope: String,
}

/// Well-known endpoints: (authorize, token, userinfo, scope)
fn known_provider_endpoints(
    registration_id: &str,
) -> Option<(&'static str, &'static str, &'static str, &'static str)> {
    match registration_id {
        "google" => Some((
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
            "https://openidconnect.googleapis.com/v1/userinfo",
            "openid email profile",
        )),
        "kakao" => Some((
            "https://kauth.kakao.com/oauth/authorize",
            "https://kauth.kakao.com/oauth/token",
            "https://kapi.kakao.com/v2/user/me",
            "profile_nickname account_email",
        )),
        _ => None,
    }
}

impl OAuth2ProviderConfig {
    /// Load one provider from `OAUTH2_<NAME>_*` variables
    fn from_env(registration_id: &str) -> Result<Self> {
        let registration_id = registration_id.trim().to_lowercase();
        let prefix = format!("OAUTH2_{}", registration_id.to_uppercase());
        let var = |suffix: &str| env::var(format!("{}_{}", prefix, suffix)).ok();
        let defaults = known_provider_endpoints(&registration_id);

        let endpoint = |suffix: &str, default: Option<&str>| -> Result<String> {
            match var(suffix).or_else(|| default.map(str::to_string)) {
                Some(value) => Ok(value),
                None => bail!("{}_{} is required for provider '{}'", prefix, suffix, registration_id),
            }
        };

        Ok(Self {
            client_id: var("CLIENT_ID")
                .with_context(|| format!("{}_CLIENT_ID is required", prefix))?,
            client_secret: var("CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: var("REDIRECT_URI")
                .with_context(|| format!("{}_REDIRECT_URI is required", prefix))?,
            authorize_url: endpoint("AUTHORIZE_URL", defaults.map(|d| d.0))?,
            token_url: endpoint("TOKEN_URL", defaults.map(|d| d.1))?,
            userinfo_url: endpoint("USERINFO_URL", defaults.map(|d| d.2))?,
            scope: endpoint("SCOPE", defaults.map(|d| d.3).or(Some("openid email profile")))?,
            registration_id,
        })
    }
}

/// Route protection configuration
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    /// Require a bearer token on POST/PUT/DELETE store endpoints
    pub store_writes_require_auth: bool,
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            service_name: "catcheat-core".to_string(),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|s| s.to_lowercase() == "true")
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let providers = env::var("OAUTH2_PROVIDERS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|id| OAuth2ProviderConfig::from_env(id).map(|p| (p.registration_id.clone(), p)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                access_token_ttl_secs: env::var("JWT_ACCESS_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
            oauth2: OAuth2Config { providers },
            security: SecurityConfig {
                store_writes_require_auth: env_flag("STORE_WRITES_REQUIRE_AUTH"),
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                metrics_enabled: env_flag("METRICS_ENABLED"),
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "catcheat-core".to_string()),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
