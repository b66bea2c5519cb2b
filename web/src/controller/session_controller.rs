//! Controller for session lifecycle operations outside of signin proper.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::controller::{apply_cookies, ApiResponse};
use crate::params::auth::{RefreshParams, SignoutParams};
use crate::response::auth::SigninResponse;
use crate::{AppState, Error};
use domain::error::unauthenticated;
use domain::session::REFRESH_TOKEN_COOKIE;

/// POST /auth/refresh
///
/// Exchanges a refresh token (from the body, or the refresh cookie for
/// browser clients) for a fresh access/refresh pair.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body(content = RefreshParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Fresh session issued"),
        (status = 401, description = "Missing, expired or invalid refresh token"),
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(params): Json<RefreshParams>,
) -> Result<impl IntoResponse, Error> {
    let refresh_token = params
        .refresh_token
        .or_else(|| {
            jar.get(REFRESH_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
        })
        .ok_or_else(|| unauthenticated("Missing refresh token"))?;

    let session = app_state
        .auth
        .refresh_session(app_state.db_conn_ref(), &refresh_token)
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

/// GET|POST /auth/signout
///
/// Clears the session cookies. Succeeds whether or not a session existed;
/// bearer-only clients simply drop their tokens. With a `redirect_uri` on
/// the allow-list the browser is sent there, otherwise the body is
/// `{"user": null}`.
#[utoipa::path(
    get,
    path = "/auth/signout",
    params(SignoutParams),
    responses(
        (status = 200, description = "Session cookies cleared"),
        (status = 302, description = "Session cookies cleared, redirecting"),
        (status = 400, description = "Redirect target not on the allow-list"),
    )
)]
pub async fn signout(
    State(app_state): State<AppState>,
    Query(params): Query<SignoutParams>,
    jar: CookieJar,
) -> Result<Response, Error> {
    app_state.auth.validate_next(params.redirect_uri.as_deref())?;

    let jar = apply_cookies(jar, app_state.auth.signout_cookies());

    Ok(match params.redirect_uri.as_deref() {
        Some(redirect_uri) if !redirect_uri.is_empty() => {
            (jar, Redirect::temporary(redirect_uri)).into_response()
        }
        _ => (
            jar,
            Json(ApiResponse::new(
                StatusCode::OK.into(),
                json!({ "user": null }),
            )),
        )
            .into_response(),
    })
}
