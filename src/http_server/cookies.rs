//! Session cookie transport
//!
//! The session token travels in an HTTP-only, strict same-site cookie.

use axum::http::{header::COOKIE, HeaderMap};
use cookie::{time::Duration, Cookie, SameSite};

pub const SESSION_COOKIE: &str = "token";

/// Cookie carrying a freshly issued session token
pub fn session_cookie(token: &str, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Cookie that makes the browser drop the session
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Session token from the request's Cookie headers, if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}
