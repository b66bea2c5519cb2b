//! Session issuance: minting and verifying the access/refresh JWT pair.
//!
//! Access and refresh tokens are signed independently with distinct secrets
//! and expiries from config. Validity is purely cryptographic: there is no
//! server-side revocation list, and `signout` only decides which client-held
//! cookies to clear.
//!
//! This module is deliberately split from the transport: everything here is
//! pure computation over `Config` (what to sign, which cookies to set), and
//! the `web` layer performs the actual response mutation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::{config_error, AuthErrorKind, DomainErrorKind, Error};
use crate::token_pair::TokenPair;
use crate::Id;
use service::config::Config;

pub use claims::TokenClaims;

pub(crate) mod claims;

/// Cookie names under which the pair travels for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Which of the two session tokens an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// A pure description of one Set-Cookie the transport should write.
/// `max_age_seconds == 0` clears the cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieSpec {
    pub name: &'static str,
    pub value: String,
    pub max_age_seconds: i64,
    pub domain: Option<String>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
}

/// Mint a fresh access/refresh pair for `user_id`.
pub fn issue_tokens(config: &Config, user_id: Id) -> Result<TokenPair, Error> {
    let access_token = sign(
        &signing_secret(config, TokenKind::Access)?,
        user_id,
        config.jwt_expiry_seconds,
    )?;
    let refresh_token = sign(
        &signing_secret(config, TokenKind::Refresh)?,
        user_id,
        config.jwt_refresh_expiry_seconds,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Check signature and expiry of `token` against the secret for `kind`.
///
/// Expired and otherwise-invalid tokens fail with distinct kinds; the web
/// layer renders both as 401.
pub fn verify(config: &Config, token: &str, kind: TokenKind) -> Result<TokenClaims, Error> {
    let secret = signing_secret(config, kind)?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let error_kind = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                DomainErrorKind::Auth(AuthErrorKind::TokenExpired)
            }
            _ => DomainErrorKind::Auth(AuthErrorKind::TokenInvalid),
        };
        Error {
            source: Some(Box::new(e)),
            error_kind,
        }
    })
}

/// Cookies to set on a successful signin.
pub fn session_cookies(config: &Config, pair: &TokenPair) -> Vec<CookieSpec> {
    vec![
        cookie_spec(
            config,
            ACCESS_TOKEN_COOKIE,
            pair.access_token.clone(),
            config.jwt_expiry_seconds as i64,
        ),
        cookie_spec(
            config,
            REFRESH_TOKEN_COOKIE,
            pair.refresh_token.clone(),
            config.jwt_refresh_expiry_seconds as i64,
        ),
    ]
}

/// Cookies to clear on signout. Clearing cookies that were never set is
/// harmless, so signout never fails for a session-less client.
pub fn signout_cookies(config: &Config) -> Vec<CookieSpec> {
    vec![
        cookie_spec(config, ACCESS_TOKEN_COOKIE, String::new(), 0),
        cookie_spec(config, REFRESH_TOKEN_COOKIE, String::new(), 0),
    ]
}

fn cookie_spec(config: &Config, name: &'static str, value: String, max_age: i64) -> CookieSpec {
    CookieSpec {
        name,
        value,
        max_age_seconds: max_age,
        domain: config.cookie_domain(),
        path: config.cookie_path().to_string(),
        http_only: true,
        secure: config.is_production(),
    }
}

fn signing_secret(config: &Config, kind: TokenKind) -> Result<String, Error> {
    match kind {
        TokenKind::Access => config
            .jwt_secret()
            .ok_or_else(|| config_error("Missing JWT secret")),
        TokenKind::Refresh => config
            .jwt_refresh_secret()
            .ok_or_else(|| config_error("Missing JWT refresh secret")),
    }
}

fn sign(secret: &str, user_id: Id, expiry_seconds: u64) -> Result<String, Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + expiry_seconds as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secrets(access: &str, refresh: &str) -> Config {
        use clap::Parser;
        Config::parse_from([
            "auth_gateway_rs",
            "--jwt-secret",
            access,
            "--jwt-refresh-secret",
            refresh,
        ])
    }

    fn test_config() -> Config {
        config_with_secrets("access-secret-1", "refresh-secret-1")
    }

    #[test]
    fn test_issue_then_verify_round_trips_the_user_id() {
        let config = test_config();
        let user_id = Id::new_v4();

        let pair = issue_tokens(&config, user_id).unwrap();
        let claims = verify(&config, &pair.access_token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_access_and_refresh_tokens_are_not_interchangeable() {
        let config = test_config();
        let pair = issue_tokens(&config, Id::new_v4()).unwrap();

        // A refresh token does not verify under the access secret.
        let err = verify(&config, &pair.refresh_token, TokenKind::Access).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::TokenInvalid)
        );
    }

    #[test]
    fn test_token_signed_with_a_different_secret_is_invalid() {
        let config = test_config();
        let other = config_with_secrets("some-other-secret", "refresh-secret-1");

        let pair = issue_tokens(&other, Id::new_v4()).unwrap();
        let err = verify(&config, &pair.access_token, TokenKind::Access).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::TokenInvalid)
        );
    }

    #[test]
    fn test_expired_token_fails_with_expired_kind() {
        let config = test_config();
        let now = Utc::now().timestamp() as usize;
        let claims = TokenClaims {
            sub: Id::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("access-secret-1".as_bytes()),
        )
        .unwrap();

        let err = verify(&config, &token, TokenKind::Access).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::TokenExpired)
        );
    }

    #[test]
    fn test_missing_secret_is_a_config_error() {
        let config = Config::default();
        let err = issue_tokens(&config, Id::new_v4()).unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(crate::error::InternalErrorKind::Config(_))
        ));
    }

    #[test]
    fn test_signout_cookies_clear_both_names() {
        let config = test_config();
        let cookies = signout_cookies(&config);

        assert_eq!(cookies.len(), 2);
        assert!(cookies
            .iter()
            .all(|c| c.value.is_empty() && c.max_age_seconds == 0));
        assert!(cookies.iter().any(|c| c.name == ACCESS_TOKEN_COOKIE));
        assert!(cookies.iter().any(|c| c.name == REFRESH_TOKEN_COOKIE));
    }
}
