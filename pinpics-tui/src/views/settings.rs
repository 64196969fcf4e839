use crossterm::event::{KeyCode, KeyEvent};
use pinpics_types::{ApiResponse, User};
use tui_textarea::TextArea;

use super::{set_text, single_line, text_of, ViewAction};
use crate::api::ApiResult;
use crate::context::{Notifications, Session};

pub const INVALID_COLOR_MESSAGE: &str = "Background colour must look like r,g,b,a (e.g. 30,60,90,0.8).";
pub const SETTINGS_FAILED_MESSAGE: &str = "Could not save settings.";

/// Parse an `r,g,b,a` colour; channels 0-255, alpha 0-1
pub fn parse_rgba(value: &str) -> Option<(u8, u8, u8, f32)> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b, a] = parts.as_slice() else {
        return None;
    };
    let alpha: f32 = a.parse().ok()?;
    if !(0.0..=1.0).contains(&alpha) {
        return None;
    }
    Some((r.parse().ok()?, g.parse().ok()?, b.parse().ok()?, alpha))
}

#[derive(Debug)]
pub struct SettingsForm {
    pub bg_color: TextArea<'static>,
    /// Set once the field was filled from the session user
    loaded_for: Option<i64>,
    saving: bool,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsForm {
    pub fn new() -> Self {
        Self {
            bg_color: single_line("r,g,b,a (empty for default)"),
            loaded_for: None,
            saving: false,
        }
    }

    /// Fill the field from the logged-in user the first time it is seen
    pub fn sync_from(&mut self, user: Option<&User>) {
        let Some(user) = user else {
            self.loaded_for = None;
            return;
        };
        if self.loaded_for == Some(user.id) {
            return;
        }
        set_text(
            &mut self.bg_color,
            user.settings.bg_color.as_deref().unwrap_or_default(),
        );
        self.loaded_for = Some(user.id);
    }

    /// Colour to send, `Some(None)` resets to the default
    pub fn begin_save(
        &mut self,
        session: &Session,
        notifications: &mut Notifications,
    ) -> Option<Option<String>> {
        if self.saving || !session.is_logged_in() {
            return None;
        }

        let value = text_of(&self.bg_color).trim().to_string();
        if value.is_empty() {
            self.saving = true;
            return Some(None);
        }
        if parse_rgba(&value).is_none() {
            notifications.error(INVALID_COLOR_MESSAGE, None);
            return None;
        }
        self.saving = true;
        Some(Some(value))
    }

    pub fn finish_save(
        &mut self,
        result: ApiResult<ApiResponse<User>>,
        session: &mut Session,
        notifications: &mut Notifications,
    ) {
        self.saving = false;
        match result {
            Ok(response) => {
                let status = response.status;
                let message = response.message.clone();
                if let Some(user) = response.into_success_data() {
                    session.set_user(user);
                }
                notifications.push(status, message, None);
            }
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                notifications.error(SETTINGS_FAILED_MESSAGE, None);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Enter => ViewAction::SaveSettings,
            _ => {
                self.bg_color.input(key);
                ViewAction::None
            }
        }
    }
}
