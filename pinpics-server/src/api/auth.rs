use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    Json,
};
use once_cell::sync::Lazy;
use pinpics_types::{
    ApiResponse, AuthPayload, ForgotPasswordRequest, LoginRequest, RegistrationRequest,
    ResetPasswordRequest,
};
use regex::Regex;

use super::{session_token, ApiError, ApiResult, SESSION_COOKIE};
use crate::db::repositories::{NewUser, PasswordResetRepository, UserRepository};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::session::SESSION_DAYS;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email is registered, a password reset link has been sent.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

type CookieResponse<T> = (StatusCode, [(axum::http::HeaderName, String); 1], Json<ApiResponse<T>>);

/// Placeholder avatar for a new account
pub fn generated_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=ACACAC&color=fff",
        urlencoding::encode(name)
    )
}

/// `Set-Cookie` value for a fresh session
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_DAYS * 24 * 60 * 60
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn validate_registration(payload: &RegistrationRequest) -> ApiResult<()> {
    if !EMAIL_RE.is_match(payload.email.trim()) {
        return Err(ApiError::BadRequest("Please provide a valid email address.".to_string()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required.".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// POST /api/user/registration - Create an account and log it in
pub async fn registration(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>,
) -> ApiResult<CookieResponse<AuthPayload>> {
    validate_registration(&payload)?;

    let email = payload.email.trim().to_string();
    let name = payload.name.trim().to_string();
    let repo = UserRepository::new(state.db.pool.clone());

    if repo.email_taken(&email)? {
        return Err(ApiError::Conflict("Email is already registered.".to_string()));
    }
    if repo.name_taken(&name)? {
        return Err(ApiError::Conflict("Name is already taken.".to_string()));
    }

    let password_hash = hash_password_blocking(payload.password, state.bcrypt_cost).await?;
    let user = repo.create(&NewUser {
        avatar: generated_avatar(&name),
        background: generated_avatar(&name),
        name,
        email,
        password_hash,
    })?;

    let token = state.session_manager.create_session(user.id)?;
    tracing::info!("Registered user {} ({})", user.name, user.id);

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token, state.secure_cookies))],
        Json(ApiResponse::success(
            "Registration successful.",
            AuthPayload { token, user },
        )),
    ))
}

/// POST /api/user/login - Log in by account name or email
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<CookieResponse<AuthPayload>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password.".to_string());

    let repo = UserRepository::new(state.db.pool.clone());
    let record = repo
        .find_credentials(payload.username.trim())?
        .ok_or_else(invalid)?;

    if !verify_password_blocking(payload.password, record.password_hash).await? {
        tracing::debug!("Failed login for {}", record.user.name);
        return Err(invalid());
    }

    let user = record.user;
    let token = state.session_manager.create_session(user.id)?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, session_cookie(&token, state.secure_cookies))],
        Json(ApiResponse::success(
            "Logged in successfully.",
            AuthPayload { token, user },
        )),
    ))
}

/// POST /api/user/logout - End the caller's session
///
/// Succeeds without a session so clients can always clear local state.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<CookieResponse<()>> {
    if let Some(token) = session_token(&headers) {
        state.session_manager.delete_session(&token)?;
    }

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(ApiResponse::ok("Logged out.")),
    ))
}

/// POST /api/user/forgot-password - Issue a reset token
///
/// The reply never reveals whether the address is registered. The reset
/// link is written to the server log in place of an email.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let email = payload.email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(ApiError::BadRequest("Please provide a valid email address.".to_string()));
    }

    let users = UserRepository::new(state.db.pool.clone());
    if let Some(user) = users.get_by_email(email)? {
        let token = PasswordResetRepository::new(state.db.pool.clone()).create(user.id)?;
        tracing::info!("Password reset requested for user {}: token {}", user.id, token);
    }

    Ok(Json(ApiResponse::ok(FORGOT_PASSWORD_MESSAGE)))
}

/// POST /api/user/reset-password - Set a new password with a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }

    let user_id = PasswordResetRepository::new(state.db.pool.clone())
        .consume(payload.token.trim())?
        .ok_or_else(|| ApiError::BadRequest("Reset link is invalid or has expired.".to_string()))?;

    let password_hash = hash_password_blocking(payload.password, state.bcrypt_cost).await?;
    UserRepository::new(state.db.pool.clone()).update_password_hash(user_id, &password_hash)?;
    let dropped = state.session_manager.delete_user_sessions(user_id)?;
    tracing::info!("Password reset for user {}, {} sessions ended", user_id, dropped);

    Ok(Json(ApiResponse::ok("Password has been reset. Please log in.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, name: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_generated_avatar_encodes_name() {
        assert_eq!(
            generated_avatar("Mira Sol"),
            "https://ui-avatars.com/api/?name=Mira%20Sol&background=ACACAC&color=fff"
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        assert_eq!(
            session_cookie("abc", false),
            "token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=2592000"
        );
        assert!(session_cookie("abc", true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&request("mira@example.com", "mira", "secret")).is_ok());
        assert!(matches!(
            validate_registration(&request("not-an-email", "mira", "secret")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_registration(&request("mira@example.com", "  ", "secret")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_registration(&request("mira@example.com", "mira", "12345")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
