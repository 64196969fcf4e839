use axum::{extract::State, http::HeaderMap, Json};
use once_cell::sync::Lazy;
use pinpics_types::{ApiResponse, UpdateSettingsRequest, User, UserSettings};
use regex::Regex;

use super::{require_user, require_user_id, ApiError, ApiResult};
use crate::db::repositories::UserRepository;
use crate::state::AppState;

static BG_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}),(\d{1,3}),(\d{1,3})(,(0|1|0?\.\d+|1\.0+))?$").expect("valid colour regex")
});

/// Accepts `r,g,b` or `r,g,b,a` with channels in 0..=255 and alpha in 0..=1
pub fn is_valid_bg_color(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(caps) = BG_COLOR_RE.captures(&compact) else {
        return false;
    };
    (1..=3).all(|i| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u16>().ok())
            .is_some_and(|channel| channel <= 255)
    })
}

/// GET /api/user - The logged-in user
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = require_user(&state, &headers, "Not logged in.")?;
    Ok(Json(ApiResponse::success("User loaded.", user)))
}

/// PUT /api/user/settings - Update display settings
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user_id = require_user_id(&state, &headers, "Please log in to change settings.")?;

    let bg_color = match payload.bg_color.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) if is_valid_bg_color(value) => {
            Some(value.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        }
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Background colour must look like r,g,b or r,g,b,a.".to_string(),
            ))
        }
    };

    let repo = UserRepository::new(state.db.pool.clone());
    repo.update_settings(user_id, &UserSettings { bg_color })?;
    let user = repo
        .get_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::success("Settings saved.", user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bg_color_validation() {
        assert!(is_valid_bg_color("10,20,30"));
        assert!(is_valid_bg_color("255,255,255,0.5"));
        assert!(is_valid_bg_color("0, 0, 0, 1"));
        assert!(!is_valid_bg_color("256,0,0"));
        assert!(!is_valid_bg_color("red"));
        assert!(!is_valid_bg_color("1,2"));
        assert!(!is_valid_bg_color("1,2,3,1.5"));
    }
}
