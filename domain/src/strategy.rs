//! Strategy configuration and the per-process dispatch table.
//!
//! Each enabled strategy is a tagged variant carrying its credentials;
//! missing credentials for an enabled strategy fail at activation time, not
//! on the first signin attempt.

use crate::error::{config_error, validation_error, Error};
use crate::gateway::oauth::google::GoogleOAuthClient;
use crate::gateway::oauth::supabase::SupabaseAuthClient;
use crate::gateway::oauth::OAuthProvider;
use crate::provider::Provider;
use service::config::Config;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalAuthConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleAuthConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseAuthConfig {
    pub url: String,
    pub anon_key: String,
}

/// One configured strategy, dispatched by its provider tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStrategy {
    Local(LocalAuthConfig),
    Google(GoogleAuthConfig),
    Supabase(SupabaseAuthConfig),
}

impl AuthStrategy {
    pub fn provider(&self) -> Provider {
        match self {
            AuthStrategy::Local(_) => Provider::Local,
            AuthStrategy::Google(_) => Provider::Google,
            AuthStrategy::Supabase(_) => Provider::Supabase,
        }
    }
}

/// Collect the strategy list from config, validating credential pairs.
///
/// A strategy is registered when its credentials are present; a half-configured
/// strategy (one of a credential pair missing) is a configuration error.
pub fn strategies_from_config(config: &Config) -> Result<Vec<AuthStrategy>, Error> {
    let mut strategies = Vec::new();

    if config.local_auth_enabled {
        strategies.push(AuthStrategy::Local(LocalAuthConfig));
    }

    match (config.google_client_id(), config.google_client_secret()) {
        (Some(client_id), Some(client_secret)) => {
            strategies.push(AuthStrategy::Google(GoogleAuthConfig {
                client_id,
                client_secret,
            }));
        }
        (None, None) => {}
        _ => {
            return Err(config_error(
                "Google strategy requires both a client id and a client secret",
            ))
        }
    }

    match (config.supabase_url(), config.supabase_anon_key()) {
        (Some(url), Some(anon_key)) => {
            strategies.push(AuthStrategy::Supabase(SupabaseAuthConfig { url, anon_key }));
        }
        (None, None) => {}
        _ => {
            return Err(config_error(
                "Supabase strategy requires both a project URL and an anon key",
            ))
        }
    }

    Ok(strategies)
}

/// Dispatch table over the configured strategies: at most one adapter per
/// provider type, built once at startup and read-only afterwards.
pub struct Strategies {
    local_enabled: bool,
    google: Option<GoogleOAuthClient>,
    supabase: Option<SupabaseAuthClient>,
}

impl Strategies {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut registry = Self {
            local_enabled: false,
            google: None,
            supabase: None,
        };

        for strategy in strategies_from_config(config)? {
            match strategy {
                AuthStrategy::Local(_) => registry.local_enabled = true,
                AuthStrategy::Google(google) => {
                    registry.google = Some(GoogleOAuthClient::new(
                        google.client_id,
                        google.client_secret,
                    )?);
                }
                AuthStrategy::Supabase(supabase) => {
                    registry.supabase =
                        Some(SupabaseAuthClient::new(supabase.url, supabase.anon_key)?);
                }
            }
        }

        Ok(registry)
    }

    pub fn local_enabled(&self) -> bool {
        self.local_enabled
    }

    pub fn is_registered(&self, provider: Provider) -> bool {
        match provider {
            Provider::Local => self.local_enabled,
            Provider::Google => self.google.is_some(),
            Provider::Supabase => self.supabase.is_some(),
        }
    }

    /// Look up the redirect-based adapter for `provider`.
    pub fn oauth(&self, provider: Provider) -> Result<&dyn OAuthProvider, Error> {
        let adapter: Option<&dyn OAuthProvider> = match provider {
            Provider::Local => {
                return Err(validation_error(
                    "The local strategy has no redirect-based signin",
                ))
            }
            Provider::Google => self.google.as_ref().map(|c| c as &dyn OAuthProvider),
            Provider::Supabase => self.supabase.as_ref().map(|c| c as &dyn OAuthProvider),
        };

        adapter.ok_or_else(|| {
            config_error(&format!("The {provider} strategy is not configured"))
        })
    }
}
