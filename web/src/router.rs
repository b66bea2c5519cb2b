use crate::{
    controller::health_check_controller, middleware::auth::require_auth, params, response,
    AppState,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::controller::{
    local_auth_controller, oauth_controller, session_controller, user_controller,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Auth Gateway API"
        ),
        paths(
            health_check_controller::health_check,
            local_auth_controller::signin,
            local_auth_controller::signup,
            oauth_controller::signin_with_provider,
            oauth_controller::callback,
            oauth_controller::token,
            session_controller::refresh,
            session_controller::signout,
            user_controller::me,
        ),
        components(
            schemas(
                domain::users::Model,
                domain::token_pair::TokenPair,
                params::auth::CredentialsParams,
                params::auth::TokenExchangeParams,
                params::auth::RefreshParams,
                response::auth::SigninResponse,
                response::auth::SignupResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "auth_gateway", description = "Pluggable authentication gateway API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer token authentication requirement for gaining access to our
// protected API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state);

    Router::new()
        .merge(health_routes())
        .merge(auth_routes(app_state.clone()))
        .merge(user_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// These routes bootstrap or tear down a session, so they are the explicit
// public surface: everything else sits behind `require_auth`.
fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/signin", post(local_auth_controller::signin))
        .route("/auth/signup", post(local_auth_controller::signup))
        .route("/auth/refresh", post(session_controller::refresh))
        .route(
            "/auth/signout",
            get(session_controller::signout).post(session_controller::signout),
        )
        .route(
            "/auth/{provider}",
            get(oauth_controller::signin_with_provider),
        )
        .route("/auth/{provider}/callback", get(oauth_controller::callback))
        .route("/auth/{provider}/token", post(oauth_controller::token))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users/me", get(user_controller::me))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
