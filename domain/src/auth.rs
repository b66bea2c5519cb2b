//! The auth gateway: strategy dispatch and end-to-end signin orchestration.
//!
//! Every login attempt, whichever strategy verified the identity, funnels
//! through the same sequence: resolve-or-create the user, issue a single-use
//! intermediary code, redeem it, mint the JWT session pair. A failed step
//! terminates the attempt and the client restarts from the beginning; OAuth
//! codes are single-use, so an automatic retry could only fail again.

use log::*;
use sea_orm::DatabaseConnection;

use crate::auth_code::{AuthCode, AuthCodeStore};
use crate::error::{invalid_auth_code, unauthenticated, validation_error, Error};
use crate::gateway::oauth::{UserMetadata, DEFAULT_SCOPES};
use crate::provider::Provider;
use crate::session::{self, CookieSpec, TokenClaims, TokenKind};
use crate::strategy::Strategies;
use crate::token_pair::TokenPair;
use crate::{user, users, Id};
use chrono::Duration;
use service::config::Config;

/// Everything a successful signin hands back to the transport layer.
#[derive(Debug, Clone)]
pub struct SigninSession {
    pub token_pair: TokenPair,
    pub user: users::Model,
}

/// Process-wide authentication façade.
///
/// Constructed once at startup with its dependencies passed explicitly;
/// request handlers only ever borrow it.
pub struct AuthGateway {
    config: Config,
    strategies: Strategies,
    code_store: AuthCodeStore,
}

impl AuthGateway {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let strategies = Strategies::from_config(config)?;
        let code_store =
            AuthCodeStore::with_ttl(Duration::seconds(config.auth_code_expiry_seconds as i64));

        Ok(Self::with_parts(config.clone(), strategies, code_store))
    }

    /// Assemble a gateway from already-built parts.
    pub fn with_parts(config: Config, strategies: Strategies, code_store: AuthCodeStore) -> Self {
        Self {
            config,
            strategies,
            code_store,
        }
    }

    /// Reject a `next` redirect target that is not on the configured
    /// allow-list. An absent target is fine; the default destination is used.
    pub fn validate_next(&self, next: Option<&str>) -> Result<(), Error> {
        match next {
            None => Ok(()),
            Some(next) if next.is_empty() => Ok(()),
            Some(next) => {
                if self.config.redirect_urls().iter().any(|url| url == next) {
                    Ok(())
                } else {
                    warn!("Rejected redirect target outside the allow-list: {next}");
                    Err(validation_error("Invalid redirect URL"))
                }
            }
        }
    }

    /// The callback URL registered with providers for this deployment.
    pub fn callback_url(&self, provider: Provider) -> String {
        format!(
            "{}/auth/{}/callback",
            self.config.public_base_url().trim_end_matches('/'),
            provider
        )
    }

    /// Build the provider authorization URL that starts a redirect-based
    /// signin. Validates `next` before anything else; no URL is constructed
    /// for a disallowed target.
    pub fn begin_signin(
        &self,
        provider: Provider,
        scopes: Option<&[String]>,
        next: Option<&str>,
    ) -> Result<String, Error> {
        self.validate_next(next)?;

        let adapter = self.strategies.oauth(provider)?;
        let redirect_uri = self.callback_url(provider);

        let requested_scopes: Vec<&str> = match scopes {
            Some(scopes) if !scopes.is_empty() => scopes.iter().map(String::as_str).collect(),
            _ => DEFAULT_SCOPES.to_vec(),
        };
        let state = next.unwrap_or_default();

        info!("Redirecting signin to the {provider} authorization endpoint");
        Ok(adapter.authorization_url(&requested_scopes, &redirect_uri, state))
    }

    /// Handle the provider's redirect back: exchange the provider code,
    /// resolve the user, and issue the intermediary auth code the client
    /// will trade for a session.
    pub async fn handle_callback(
        &self,
        db: &DatabaseConnection,
        provider: Provider,
        code: &str,
        next: Option<&str>,
    ) -> Result<String, Error> {
        self.validate_next(next)?;

        let adapter = self.strategies.oauth(provider)?;
        let redirect_uri = self.callback_url(provider);

        let metadata = adapter.exchange_code(code, &redirect_uri).await?;
        let user = self.create_user(db, metadata).await?;
        let issued = self.issue_auth_code(&user.identifier, provider);

        info!(
            "Issued intermediary auth code for {} via {provider}",
            user.identifier
        );
        Ok(issued)
    }

    /// Find-or-create the user record for `metadata`. Looking up before
    /// creating keeps repeated signins from the same identity down to one
    /// stored user.
    pub async fn create_user(
        &self,
        db: &DatabaseConnection,
        metadata: UserMetadata,
    ) -> Result<users::Model, Error> {
        if let Some(existing) = user::find_by_identifier(db, &metadata.identifier).await? {
            return Ok(existing);
        }

        user::create(db, user::model_from_metadata(metadata)).await
    }

    /// Issue a single-use intermediary code bound to `(identifier, provider)`.
    pub fn issue_auth_code(&self, identifier: &str, provider: Provider) -> String {
        self.code_store.issue(identifier, provider)
    }

    /// Redeem an intermediary code (delete-on-read) and resolve the user it
    /// was bound to. Any failure, whether the code is unknown, consumed,
    /// expired, or its user record no longer exists, surfaces as the same
    /// invalid-code error.
    pub async fn find_by_auth_code(
        &self,
        db: &DatabaseConnection,
        code: &str,
        provider: Provider,
    ) -> Result<(AuthCode, users::Model), Error> {
        let auth_code = self.code_store.redeem(code, provider)?;

        let user = user::find_by_identifier(db, &auth_code.identifier)
            .await?
            .ok_or_else(|| {
                warn!(
                    "Auth code redeemed for an identifier with no user record: {}",
                    auth_code.identifier
                );
                invalid_auth_code()
            })?;

        Ok((auth_code, user))
    }

    /// Explicit invalidation hook; a no-op for codes already consumed.
    pub fn clear_auth_code(&self, id: Id) {
        self.code_store.clear(id);
    }

    /// Mint a session pair for `user_id`, returning the resolved user record
    /// alongside it.
    pub async fn issue_tokens(
        &self,
        db: &DatabaseConnection,
        user_id: Id,
    ) -> Result<(TokenPair, users::Model), Error> {
        let user = user::find_by_id(db, user_id).await?;
        let token_pair = session::issue_tokens(&self.config, user.id)?;
        Ok((token_pair, user))
    }

    /// The uniform signin surface: trade an intermediary code for a session,
    /// regardless of which strategy authenticated the user.
    pub async fn signin_with_code(
        &self,
        db: &DatabaseConnection,
        code: &str,
        provider: Provider,
    ) -> Result<SigninSession, Error> {
        let (auth_code, user) = self.find_by_auth_code(db, code, provider).await?;
        self.clear_auth_code(auth_code.id);

        let token_pair = session::issue_tokens(&self.config, user.id)?;

        info!("Signed in {} via {provider}", user.identifier);
        Ok(SigninSession { token_pair, user })
    }

    /// Local strategy: register a username/password user.
    pub async fn signup_with_password(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<users::Model, Error> {
        self.require_local()?;

        if username.is_empty() || password.is_empty() {
            return Err(validation_error("Username and password are required"));
        }
        if user::find_by_identifier(db, username).await?.is_some() {
            return Err(validation_error("A user with this username already exists"));
        }

        let now = chrono::Utc::now();
        let user = user::create(
            db,
            users::Model {
                id: Id::new_v4(),
                identifier: username.to_string(),
                email: None,
                display_name: None,
                picture_url: None,
                provider: Provider::Local,
                provider_id: None,
                password: Some(password.to_string()),
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
        .await?;

        info!("Registered local user {}", user.identifier);
        Ok(user)
    }

    /// Local strategy: verify a password and run the same
    /// code-issue/code-redeem sequence every other strategy uses.
    pub async fn signin_with_password(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<SigninSession, Error> {
        self.require_local()?;

        let user = user::find_by_identifier(db, username)
            .await?
            .ok_or_else(|| unauthenticated("Invalid username or password"))?;
        let password_hash = user
            .password
            .as_deref()
            .ok_or_else(|| unauthenticated("Invalid username or password"))?;
        user::verify_password(password, password_hash).await?;

        let code = self.issue_auth_code(&user.identifier, Provider::Local);
        self.signin_with_code(db, &code, Provider::Local).await
    }

    /// Exchange a refresh token for a fresh session pair.
    pub async fn refresh_session(
        &self,
        db: &DatabaseConnection,
        refresh_token: &str,
    ) -> Result<SigninSession, Error> {
        let claims = session::verify(&self.config, refresh_token, TokenKind::Refresh)?;
        let (token_pair, user) = self.issue_tokens(db, claims.user_id()?).await?;

        debug!("Refreshed session for {}", user.identifier);
        Ok(SigninSession { token_pair, user })
    }

    /// Validate an access token for the guard layer.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, Error> {
        session::verify(&self.config, token, TokenKind::Access)
    }

    /// Cookies the transport should set after a signin.
    pub fn session_cookies(&self, token_pair: &TokenPair) -> Vec<CookieSpec> {
        session::session_cookies(&self.config, token_pair)
    }

    /// Cookies the transport should clear on signout. Clearing an absent
    /// session is success, not an error.
    pub fn signout_cookies(&self) -> Vec<CookieSpec> {
        session::signout_cookies(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn require_local(&self) -> Result<(), Error> {
        if self.strategies.is_registered(Provider::Local) {
            Ok(())
        } else {
            Err(validation_error("The local strategy is not enabled"))
        }
    }
}
