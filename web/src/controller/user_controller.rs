use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::Error;

/// GET /users/me
///
/// Returns the authenticated user's record. Representative protected
/// resource; everything under the guard behaves the same way.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The authenticated user", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}
