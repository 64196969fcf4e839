pub mod auth;
pub mod error;
pub mod posts;
pub mod user;

pub use error::{ApiError, ApiResult};

use axum::http::{header::COOKIE, HeaderMap};
use pinpics_types::User;

use crate::db::repositories::UserRepository;
use crate::state::AppState;

/// Header carrying the session token for non-browser clients
pub const SESSION_HEADER: &str = "X-Session-Token";
/// Cookie carrying the session token for browsers
pub const SESSION_COOKIE: &str = "token";

/// Session token from the `X-Session-Token` header, falling back to the `token` cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolve the caller's user id or fail with 401
pub fn require_user_id(state: &AppState, headers: &HeaderMap, message: &str) -> ApiResult<i64> {
    session_token(headers)
        .and_then(|token| state.get_authenticated_user_id_from_token(&token))
        .ok_or_else(|| ApiError::Unauthorized(message.to_string()))
}

/// Resolve the caller's full user record or fail with 401
pub fn require_user(state: &AppState, headers: &HeaderMap, message: &str) -> ApiResult<User> {
    let user_id = require_user_id(state, headers, message)?;
    UserRepository::new(state.db.pool.clone())
        .get_by_id(user_id)?
        .ok_or_else(|| ApiError::Unauthorized(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_session_token_from_cookie_list() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc123; other=1"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(session_token(&headers), None);
    }
}
