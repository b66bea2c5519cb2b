//! Claims embedded in the application's session JWTs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, DomainErrorKind, AuthErrorKind};
use crate::Id;

/// Claims carried by both access and refresh tokens.
///
/// Deliberately minimal: `sub` is the user id, which is everything request
/// authentication needs. Profile data is looked up fresh so a profile change
/// never invalidates a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl TokenClaims {
    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Result<Id, Error> {
        self.sub.parse::<Id>().map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Auth(AuthErrorKind::TokenInvalid),
        })
    }
}
