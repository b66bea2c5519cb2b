use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for starting a redirect-based signin
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthStartParams {
    /// Space-delimited OAuth scopes; the provider defaults are used when absent.
    pub scope: Option<String>,
    /// Post-login redirect target. Must be on the configured allow-list.
    pub next: Option<String>,
}

/// Query parameters for the provider's redirect back
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackParams {
    pub code: String,
    /// Opaque state round-tripped through the provider; carries the `next` target.
    pub state: Option<String>,
}

/// Body of the intermediary-code exchange
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = params::auth::TokenExchangeParams)] // OpenAPI schema
pub struct TokenExchangeParams {
    pub code: Option<String>,
    pub provider: Option<String>,
}

/// Local strategy credentials
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(as = params::auth::CredentialsParams)] // OpenAPI schema
pub struct CredentialsParams {
    pub username: String,
    pub password: String,
}

/// Body of a refresh-token exchange. Browser clients send `{}` and the
/// refresh cookie is used instead.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = params::auth::RefreshParams)] // OpenAPI schema
pub struct RefreshParams {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Query parameters for signout
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignoutParams {
    /// Where to send the browser after the session cookies are cleared.
    pub redirect_uri: Option<String>,
}
