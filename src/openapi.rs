//! OpenAPI 3.0 documentation assembly
//!
//! Aggregates handler path annotations and domain schemas into a single
//! document served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CatchEat Core API",
        version = "0.1.0",
        description = "Restaurant store registry with nearby search and social login"
    ),
    tags(
        (name = "System", description = "Health checks and system status"),
        (name = "Stores", description = "Store CRUD and proximity search"),
        (name = "Auth", description = "Local signup/login and OAuth2 social login"),
        (name = "Users", description = "Authenticated user profile"),
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::domain::StoreRequest,
            crate::domain::StoreResponse,
            crate::domain::NearbyQuery,
            crate::domain::SignupInput,
            crate::domain::LoginInput,
            crate::domain::UserDto,
            crate::domain::TokenResponse,
        )
    ),
    paths(
        crate::api::health::health,
        crate::api::health::ready,

        crate::api::store::create,
        crate::api::store::get,
        crate::api::store::list,
        crate::api::store::update,
        crate::api::store::delete,
        crate::api::store::nearby,

        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::oauth2_authorize,
        crate::api::auth::oauth2_callback,

        crate::api::user::me,
    ),
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The generated document plus the `bearer_jwt` security scheme
    pub fn build() -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if let Some(c) = doc.components.as_mut() {
            c.security_schemes.insert(
                "bearer_jwt".to_string(),
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
        doc
    }
}
