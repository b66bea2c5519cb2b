//! OAuth 2.0 provider adapters.
//!
//! Every redirect-based provider follows the same three-step shape
//! (authorization URL, code-for-token exchange, userinfo fetch) and differs
//! only in endpoints and field names. Each provider is one variant behind the
//! `OAuthProvider` trait; there is no shared base with per-provider overrides.

use async_trait::async_trait;

use crate::error::Error;
use crate::provider::Provider;

pub mod google;
pub mod supabase;

/// Scopes requested when the caller does not name any.
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Canonical identity record produced by a provider adapter.
///
/// Transient: handed to the user store for find-or-create, never persisted
/// by the core itself. `identifier` is the cross-provider lookup key,
/// normally the verified email address.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMetadata {
    pub provider: Provider,
    pub provider_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub identifier: String,
    pub picture_url: Option<String>,
}

/// Token material returned by a provider's token endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
    pub scope: String,
}

/// Capability interface shared by all redirect-based providers.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// The strategy tag this adapter serves.
    fn provider(&self) -> Provider;

    /// Build the provider's authorization URL. Pure construction with no
    /// network call or side effect. `state` carries the caller's opaque
    /// post-login redirect target.
    fn authorization_url(&self, scopes: &[&str], redirect_uri: &str, state: &str) -> String;

    /// Exchange an authorization code for provider tokens, then fetch the
    /// provider's user record and normalize it.
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<UserMetadata, Error>;

    /// Obtain a fresh provider session from a provider refresh token.
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error>;
}
