use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;

use crate::extractors::RejectionType;
use crate::middleware::auth::bearer_token;
use crate::AppState;
use domain::users;

/// Extractor for handlers that need the full user record, not just claims.
/// Verifies the bearer credential and loads the user it names; rejects with
/// 401 when either step fails, so a deleted user cannot keep using a
/// still-valid token.
pub(crate) struct AuthenticatedUser(pub users::Model);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || (StatusCode::UNAUTHORIZED, "Unauthorized".to_string());

        let token =
            bearer_token(&parts.headers, parts.uri.query()).ok_or_else(unauthorized)?;
        let claims = state.auth.verify_access(&token).map_err(|e| {
            debug!("Rejected bearer credential: {e:?}");
            unauthorized()
        })?;
        let user_id = claims.user_id().map_err(|_| unauthorized())?;

        let user = domain::user::find_by_id(state.db_conn_ref(), user_id)
            .await
            .map_err(|e| {
                warn!("Authenticated user lookup failed: {e:?}");
                unauthorized()
            })?;

        Ok(AuthenticatedUser(user))
    }
}
