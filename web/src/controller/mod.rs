use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use domain::session::CookieSpec;
use serde::Serialize;

pub(crate) mod health_check_controller;
pub(crate) mod local_auth_controller;
pub(crate) mod oauth_controller;
pub(crate) mod session_controller;
pub(crate) mod user_controller;

#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

/// Render the domain's cookie decisions onto the response jar.
pub(crate) fn apply_cookies(jar: CookieJar, specs: Vec<CookieSpec>) -> CookieJar {
    specs.into_iter().fold(jar, |jar, spec| jar.add(build_cookie(spec)))
}

fn build_cookie(spec: CookieSpec) -> Cookie<'static> {
    let mut builder = Cookie::build((spec.name, spec.value))
        .path(spec.path)
        .http_only(spec.http_only)
        .secure(spec.secure)
        // Lax so the cookies survive the top-level redirect back from a provider.
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(spec.max_age_seconds));
    if let Some(domain) = spec.domain {
        builder = builder.domain(domain);
    }
    builder.build()
}
