use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// Body returned by every signin-shaped endpoint.
///
/// The access token is duplicated in the body for bearer-style clients that
/// ignore cookies; the refresh token travels only in its HttpOnly cookie.
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = response::auth::SigninResponse)] // OpenAPI schema
pub struct SigninResponse {
    pub access_token: String,
    pub user_id: Id,
}

/// Body returned after a local-strategy registration.
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = response::auth::SignupResponse)] // OpenAPI schema
pub struct SignupResponse {
    pub user_id: Id,
    pub identifier: String,
}
