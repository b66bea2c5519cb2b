use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;

use crate::AppState;

/// Authentication middleware that returns 401 Unauthorized for unauthenticated requests.
///
/// Routes are private unless a route group is explicitly assembled without
/// this layer (see `router.rs`). The bearer credential is taken from, in
/// order of precedence: the `Authorization: Bearer` header, a `token`
/// header, or a `token` query parameter. Verified claims are stored in the
/// request extensions for downstream handlers.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers(), request.uri().query()) {
        Some(token) => token,
        None => {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    match app_state.auth.verify_access(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejected bearer credential: {e:?}");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Extract the bearer credential from a request.
pub(crate) fn bearer_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(value) = headers.get("token") {
        if let Ok(value) = value.to_str() {
            return Some(value.trim().to_string());
        }
    }

    query.and_then(|query| {
        query.split('&').find_map(|pair| {
            pair.strip_prefix("token=")
                .filter(|token| !token.is_empty())
                .map(String::from)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        response::Response,
        routing::get,
        Router,
    };
    use clap::Parser;
    use sea_orm::DatabaseConnection;
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn test_config() -> Config {
        Config::parse_from([
            "auth_gateway_rs",
            "--jwt-secret",
            "access-secret-1",
            "--jwt-refresh-secret",
            "refresh-secret-1",
        ])
    }

    fn test_app_state() -> AppState {
        let db = Arc::new(DatabaseConnection::default());
        AppState::new(test_config(), &db).unwrap()
    }

    fn test_app(app_state: AppState) -> Router {
        Router::new()
            .merge(
                Router::new()
                    .route("/private", get(test_handler))
                    .route_layer(from_fn_with_state(app_state.clone(), require_auth)),
            )
            .route("/public", get(test_handler))
            .with_state(app_state)
    }

    fn access_token(app_state: &AppState) -> String {
        let user_id = domain::Id::new_v4();
        domain::session::issue_tokens(&app_state.config, user_id)
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_private_route_returns_401_with_no_credential() {
        let app = test_app(test_app_state());

        let request = HttpRequest::builder()
            .uri("/private")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_route_succeeds_with_no_credential() {
        let app = test_app(test_app_state());

        let request = HttpRequest::builder()
            .uri("/public")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_private_route_returns_401_with_a_garbage_token() {
        let app = test_app(test_app_state());

        let request = HttpRequest::builder()
            .uri("/private")
            .header(AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_private_route_accepts_a_valid_bearer_header() {
        let app_state = test_app_state();
        let token = access_token(&app_state);
        let app = test_app(app_state);

        let request = HttpRequest::builder()
            .uri("/private")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_private_route_accepts_the_token_query_parameter() {
        let app_state = test_app_state();
        let token = access_token(&app_state);
        let app = test_app(app_state);

        let request = HttpRequest::builder()
            .uri(format!("/private?token={token}"))
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_authorization_header_takes_precedence_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer header-token".parse().unwrap());

        let token = bearer_token(&headers, Some("token=query-token"));
        assert_eq!(token, Some("header-token".to_string()));
    }

    #[test]
    fn test_custom_token_header_is_second_in_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("token", "plain-token".parse().unwrap());

        let token = bearer_token(&headers, Some("token=query-token"));
        assert_eq!(token, Some("plain-token".to_string()));
    }
}
