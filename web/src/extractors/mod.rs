pub(crate) mod authenticated_user;

use axum::http::StatusCode;

pub(crate) type RejectionType = (StatusCode, String);
