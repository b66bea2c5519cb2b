//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// The one client-visible message for a failed auth-code redemption.
/// Never varies with the cause (missing, consumed or expired), so a caller
/// cannot probe which codes ever existed.
pub const INVALID_AUTH_CODE_MESSAGE: &str = "Invalid authentication code. Please try again.";

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: `domain` is dependent on `entity_api`, and `web` is dependent on
/// `domain`, but `web` should not be dependent, directly, on `entity_api`. Ultimately
/// the various `error_kind`s are used by `web` to return appropriate HTTP status codes
/// and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Auth(AuthErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config(String),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the
/// "Entity" layer (`entity_api` and `entity`). These errors are translated from the
/// `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Unauthenticated,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The remote identity provider answered with a non-success status.
    Upstream {
        status: u16,
        body: String,
    },
    Other(String),
}

/// Failures of the authentication protocol itself, as opposed to failures of
/// the machinery underneath it.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    /// Malformed or disallowed input, e.g. a redirect target outside the allow-list.
    Validation(String),
    /// Missing or unusable credential.
    Unauthenticated(String),
    TokenExpired,
    TokenInvalid,
    /// Intermediary auth code not found, already consumed, or expired.
    InvalidAuthCode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper to build a configuration error (missing/invalid strategy credentials).
pub fn config_error(message: &str) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(message.to_string())),
    }
}

/// Helper to build a validation error for disallowed input.
pub fn validation_error(message: &str) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Auth(AuthErrorKind::Validation(message.to_string())),
    }
}

/// Helper to build an unauthenticated error for a missing/unusable credential.
pub fn unauthenticated(message: &str) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Auth(AuthErrorKind::Unauthenticated(message.to_string())),
    }
}

/// Helper to build the uniform invalid-auth-code error.
pub fn invalid_auth_code() -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Auth(AuthErrorKind::InvalidAuthCode),
    }
}

/// Helper to build an upstream error preserving the provider's HTTP status and body.
pub fn upstream_error(status: u16, body: String) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream { status, body }),
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            _ => EntityErrorKind::Other("EntityApiErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JWT encoding related error".to_string(),
            )),
        }
    }
}
