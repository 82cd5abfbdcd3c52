//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::middleware::{
    normalize_error_response, store_write_guard, ObservabilityLayer, StoreWriteGuard,
};
use crate::oauth2::HttpOAuth2Client;
use crate::openapi::ApiDoc;
use crate::repository::{StoreRepositoryImpl, UserRepositoryImpl};
use crate::service::{AuthService, StoreService};
use crate::state::HasServices;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub store_service: Arc<StoreService<StoreRepositoryImpl>>,
    pub auth_service: Arc<AuthService<UserRepositoryImpl>>,
    pub oauth2_client: Arc<HttpOAuth2Client>,
    pub jwt_manager: JwtManager,
}

impl HasServices for AppState {
    type StoreRepo = StoreRepositoryImpl;
    type UserRepo = UserRepositoryImpl;
    type OAuth2 = HttpOAuth2Client;

    fn config(&self) -> &Config {
        &self.config
    }

    fn store_service(&self) -> &StoreService<Self::StoreRepo> {
        &self.store_service
    }

    fn auth_service(&self) -> &AuthService<Self::UserRepo> {
        &self.auth_service
    }

    fn oauth2_client(&self) -> &Self::OAuth2 {
        &self.oauth2_client
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Run the HTTP server
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");

    let store_repo = Arc::new(StoreRepositoryImpl::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));

    let jwt_manager = JwtManager::new(config.jwt.clone());
    let oauth2_client = Arc::new(HttpOAuth2Client::new()?);

    let store_service = Arc::new(StoreService::new(store_repo));
    let auth_service = Arc::new(AuthService::new(user_repo, jwt_manager.clone()));

    if config.oauth2.providers.is_empty() {
        info!("No OAuth2 providers configured, social login disabled");
    } else {
        let mut providers: Vec<_> = config.oauth2.providers.keys().cloned().collect();
        providers.sort();
        info!("OAuth2 providers enabled: {}", providers.join(", "));
    }
    if config.security.store_writes_require_auth {
        info!("Store write endpoints require authentication");
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        store_service,
        auth_service,
        oauth2_client,
        jwt_manager,
    };

    let app = build_router(state).merge(
        Router::new()
            .route("/metrics", get(api::metrics::metrics_handler))
            .with_state(Arc::new(prometheus_handle)),
    );

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::build())
}

/// Build the HTTP router with generic state type
///
/// Generic over the state so HTTP tests can drive the production routes with
/// in-memory repositories.
pub fn build_router<S: HasServices>(state: S) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let write_guard = StoreWriteGuard::new(
        state.config().security.store_writes_require_auth,
        state.jwt_manager().clone(),
    );

    let store_reads = Router::new()
        .route("/api/stores", get(api::store::list::<S>))
        .route("/api/stores/nearby", get(api::store::nearby::<S>))
        .route("/api/stores/{id}", get(api::store::get::<S>));

    let store_writes = Router::new()
        .route("/api/stores", post(api::store::create::<S>))
        .route(
            "/api/stores/{id}",
            put(api::store::update::<S>).delete(api::store::delete::<S>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            write_guard,
            store_write_guard,
        ));

    Router::new()
        // Health endpoints
        .route("/", get(api::health::health))
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        // API documentation
        .route("/api-docs/openapi.json", get(openapi_json))
        // Auth endpoints
        .route("/auth/signup", post(api::auth::signup::<S>))
        .route("/auth/login", post(api::auth::login::<S>))
        .route(
            "/auth/oauth2/{provider}/authorize",
            get(api::auth::oauth2_authorize::<S>),
        )
        .route(
            "/auth/oauth2/{provider}/callback",
            get(api::auth::oauth2_callback::<S>),
        )
        // Users
        .route("/api/users/me", get(api::user::me::<S>))
        // Stores
        .merge(store_reads)
        .merge(store_writes)
        // Add middleware
        .layer(axum::middleware::from_fn(normalize_error_response))
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
