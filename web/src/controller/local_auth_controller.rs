//! Controller for the local username/password strategy.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use log::*;

use crate::controller::{apply_cookies, ApiResponse};
use crate::params::auth::CredentialsParams;
use crate::response::auth::{SigninResponse, SignupResponse};
use crate::{AppState, Error};

/// POST /auth/signin
///
/// Verifies a username/password pair and issues the application session.
/// Internally this runs the same intermediary-code exchange as the
/// redirect-based strategies.
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body(content = CredentialsParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Session issued; tokens returned and set as cookies"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn signin(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(creds): Json<CredentialsParams>,
) -> Result<impl IntoResponse, Error> {
    let session = app_state
        .auth
        .signin_with_password(app_state.db_conn_ref(), &creds.username, &creds.password)
        .await
        .inspect_err(|_| warn!("Password signin failed for {:?}", creds.username))?;

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

/// POST /auth/signup
///
/// Registers a local-strategy user. The password is hashed by the store;
/// signing in afterwards uses the normal signin endpoint.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body(content = CredentialsParams, content_type = "application/json"),
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Missing credentials or username already taken"),
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(creds): Json<CredentialsParams>,
) -> Result<impl IntoResponse, Error> {
    let user = app_state
        .auth
        .signup_with_password(app_state.db_conn_ref(), &creds.username, &creds.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            SignupResponse {
                user_id: user.id,
                identifier: user.identifier,
            },
        )),
    ))
}
