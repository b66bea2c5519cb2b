use serde::Serialize;
use utoipa::ToSchema;

/// An access/refresh JWT pair minted for an authenticated user.
/// Note: This struct does not have a corresponding entity in the database;
/// token validity is purely cryptographic.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[schema(as = token_pair::TokenPair)] // OpenAPI schema
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
