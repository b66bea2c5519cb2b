use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    AuthErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind,
    InternalErrorKind, INVALID_AUTH_CODE_MESSAGE,
};

extern crate log;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// This is where domain error kinds become HTTP status codes. The mapping is
// the whole of the client-visible error contract: invalid auth codes always
// render the same 400 body, and every credential failure collapses to a
// bare 401.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Auth(auth_error_kind) => match auth_error_kind {
                AuthErrorKind::Validation(message) => {
                    (StatusCode::BAD_REQUEST, message).into_response()
                }
                AuthErrorKind::InvalidAuthCode => {
                    (StatusCode::BAD_REQUEST, INVALID_AUTH_CODE_MESSAGE).into_response()
                }
                AuthErrorKind::Unauthenticated(_)
                | AuthErrorKind::TokenExpired
                | AuthErrorKind::TokenInvalid => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
                }
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
                    }
                    EntityErrorKind::Other(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                InternalErrorKind::Config(_) | InternalErrorKind::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => {
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
                // A 4xx from the provider means the client sent something the
                // provider rejected (stale or forged code); everything else is
                // an upstream fault.
                ExternalErrorKind::Upstream { status, .. } if (400..500).contains(&status) => {
                    (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
                }
                ExternalErrorKind::Upstream { .. } => {
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
                ExternalErrorKind::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
