//! Controller for the redirect-based signin flows.
//!
//! One controller serves every registered OAuth strategy; the `{provider}`
//! path segment picks the adapter through the gateway's dispatch table.
//!
//! Note: the begin/callback endpoints work via browser redirects and so take
//! everything from query parameters, never custom headers.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use crate::controller::{apply_cookies, ApiResponse};
use crate::params::auth::{OAuthCallbackParams, OAuthStartParams, TokenExchangeParams};
use crate::response::auth::SigninResponse;
use crate::{AppState, Error};
use domain::error::validation_error;
use domain::provider::Provider;

fn parse_provider(provider: &str) -> Result<Provider, Error> {
    Provider::from_str(provider)
        .map_err(|_| validation_error("Unknown authentication provider").into())
}

/// GET /auth/{provider}
///
/// Starts a redirect-based signin by sending the browser to the provider's
/// authorization endpoint. A `next` target outside the allow-list is
/// rejected before any provider URL is built.
#[utoipa::path(
    get,
    path = "/auth/{provider}",
    params(
        ("provider" = String, Path, description = "Registered strategy tag, e.g. google"),
        OAuthStartParams,
    ),
    responses(
        (status = 302, description = "Redirect to the provider authorization endpoint"),
        (status = 400, description = "Unknown provider or disallowed redirect target"),
        (status = 500, description = "Strategy not configured"),
    )
)]
pub async fn signin_with_provider(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthStartParams>,
) -> Result<impl IntoResponse, Error> {
    let provider = parse_provider(&provider)?;
    let scopes = params
        .scope
        .map(|scope| scope.split_whitespace().map(String::from).collect::<Vec<_>>());

    let url = app_state
        .auth
        .begin_signin(provider, scopes.as_deref(), params.next.as_deref())?;
    Ok(Redirect::temporary(&url))
}

/// GET /auth/{provider}/callback
///
/// Handles the provider's redirect back: exchanges the provider code, then
/// sends the browser on to `next` (or the default destination) carrying the
/// single-use intermediary code.
#[utoipa::path(
    get,
    path = "/auth/{provider}/callback",
    params(
        ("provider" = String, Path, description = "Registered strategy tag, e.g. google"),
        OAuthCallbackParams,
    ),
    responses(
        (status = 302, description = "Redirect to the application with an intermediary code"),
        (status = 400, description = "Invalid callback parameters"),
        (status = 502, description = "Provider exchange failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let provider = parse_provider(&provider)?;
    let next = params.state.as_deref().filter(|state| !state.is_empty());

    let issued = app_state
        .auth
        .handle_callback(app_state.db_conn_ref(), provider, &params.code, next)
        .await?;

    let target = next
        .map(String::from)
        .or_else(|| app_state.config.default_redirect_url().map(String::from))
        .ok_or_else(|| domain::error::config_error("No default redirect URL is configured"))?;

    Ok(Redirect::temporary(&format!(
        "{target}?code={issued}&provider={provider}"
    )))
}

/// POST /auth/{provider}/token
///
/// The uniform signin surface: trades an intermediary code for the
/// application session, whichever strategy authenticated the user.
#[utoipa::path(
    post,
    path = "/auth/{provider}/token",
    params(
        ("provider" = String, Path, description = "Registered strategy tag, e.g. google"),
    ),
    request_body(content = TokenExchangeParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Session issued; tokens returned and set as cookies"),
        (status = 400, description = "Missing input or invalid authentication code"),
    )
)]
pub async fn token(
    State(app_state): State<AppState>,
    Path(route_provider): Path<String>,
    jar: CookieJar,
    Json(input): Json<TokenExchangeParams>,
) -> Result<impl IntoResponse, Error> {
    // The route segment must name a known strategy even though the body's
    // provider tag drives redemption, mirroring the redirect surface.
    parse_provider(&route_provider)?;

    let code = input
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| validation_error("Authorization code is missing. Please provide a valid code."))?;
    let provider = input
        .provider
        .filter(|provider| !provider.is_empty())
        .ok_or_else(|| validation_error("Provider is missing. Please provide a valid provider."))?;
    let provider = parse_provider(&provider)?;

    let session = app_state
        .auth
        .signin_with_code(app_state.db_conn_ref(), &code, provider)
        .await?;

    let jar = apply_cookies(jar, app_state.auth.session_cookies(&session.token_pair));
    Ok((
        jar,
        Json(ApiResponse::new(
            StatusCode::OK.into(),
            SigninResponse {
                access_token: session.token_pair.access_token,
                user_id: session.user.id,
            },
        )),
    ))
}
