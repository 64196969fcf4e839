use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pinpics_types::{ApiResponse, AuthPayload, User};
use tui_textarea::TextArea;

use super::{clear, masked_line, single_line, text_of, ViewAction};
use crate::api::ApiResult;
use crate::context::{Notifications, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Registration,
    Login,
    ForgotPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
}

/// Request the app should send for a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Registration {
        name: String,
        email: String,
        password: String,
    },
    Login {
        username: String,
        password: String,
    },
    ForgotPassword {
        email: String,
    },
}

/// What the app has to do after a finished submit
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub close_window: bool,
    /// Token to keep for later requests and persist
    pub token: Option<String>,
}

/// Registration / login / forgot-password form
#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: AuthField,
    pub username: TextArea<'static>,
    pub email: TextArea<'static>,
    pub password: TextArea<'static>,
    submitting: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Registration,
            focus: AuthField::Username,
            username: single_line("Username"),
            email: single_line("Email"),
            password: masked_line("Password"),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Fields shown in the current mode, in tab order
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Registration => &[AuthField::Username, AuthField::Email, AuthField::Password],
            AuthMode::Login => &[AuthField::Username, AuthField::Password],
            AuthMode::ForgotPassword => &[AuthField::Email],
        }
    }

    pub fn value(&self, field: AuthField) -> String {
        text_of(self.input(field))
    }

    pub fn input(&self, field: AuthField) -> &TextArea<'static> {
        match field {
            AuthField::Username => &self.username,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    fn input_mut(&mut self, field: AuthField) -> &mut TextArea<'static> {
        match field {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn enter_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        clear(&mut self.username);
        clear(&mut self.password);
        self.focus = self.fields()[0];
    }

    /// Registration and Login swap; ForgotPassword goes to Registration
    pub fn toggle_registration(&mut self) {
        let next = match self.mode {
            AuthMode::Registration => AuthMode::Login,
            AuthMode::Login | AuthMode::ForgotPassword => AuthMode::Registration,
        };
        self.enter_mode(next);
    }

    /// Enter ForgotPassword, or leave it for Login
    pub fn toggle_forgot_password(&mut self) {
        let next = match self.mode {
            AuthMode::ForgotPassword => AuthMode::Login,
            AuthMode::Registration | AuthMode::Login => AuthMode::ForgotPassword,
        };
        self.enter_mode(next);
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + fields.len() - 1) % fields.len()];
    }

    /// Build the request for the current mode
    ///
    /// Login raises the session's loading flag until the reply arrives.
    pub fn begin_submit(&mut self, session: &mut Session) -> Option<AuthRequest> {
        if self.submitting {
            return None;
        }

        let request = match self.mode {
            AuthMode::Registration => AuthRequest::Registration {
                name: self.value(AuthField::Username).trim().to_string(),
                email: self.value(AuthField::Email).trim().to_string(),
                password: self.value(AuthField::Password),
            },
            AuthMode::Login => {
                session.user_loading = true;
                AuthRequest::Login {
                    username: self.value(AuthField::Username).trim().to_string(),
                    password: self.value(AuthField::Password),
                }
            }
            AuthMode::ForgotPassword => AuthRequest::ForgotPassword {
                email: self.value(AuthField::Email).trim().to_string(),
            },
        };
        self.submitting = true;
        Some(request)
    }

    pub fn finish_registration(
        &mut self,
        result: ApiResult<ApiResponse<AuthPayload>>,
        session: &mut Session,
        notifications: &mut Notifications,
    ) -> AuthOutcome {
        self.submitting = false;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error during registration: {}", e);
                return AuthOutcome::default();
            }
        };

        notifications.push(response.status, response.message.clone(), None);
        match response.into_success_data() {
            Some(payload) => {
                self.mode = AuthMode::Login;
                session.set_user(payload.user);
                AuthOutcome {
                    close_window: true,
                    token: Some(payload.token),
                }
            }
            None => AuthOutcome::default(),
        }
    }

    /// `user` is the follow-up `get_user` reply, present when login succeeded
    pub fn finish_login(
        &mut self,
        result: ApiResult<ApiResponse<AuthPayload>>,
        user: Option<ApiResult<ApiResponse<User>>>,
        session: &mut Session,
        notifications: &mut Notifications,
    ) -> AuthOutcome {
        self.submitting = false;
        session.user_loading = false;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error during login: {}", e);
                return AuthOutcome::default();
            }
        };

        let status = response.status;
        let message = response.message.clone();
        let outcome = match response.into_success_data() {
            Some(payload) => {
                let current = match user {
                    Some(Ok(reply)) if reply.is_success() => reply.data,
                    Some(Ok(reply)) => {
                        log::warn!("get_user after login failed: {}", reply.message);
                        None
                    }
                    Some(Err(e)) => {
                        log::error!("get_user after login failed: {}", e);
                        None
                    }
                    None => None,
                };
                session.set_user(current.unwrap_or(payload.user));
                AuthOutcome {
                    close_window: true,
                    token: Some(payload.token),
                }
            }
            None => AuthOutcome::default(),
        };

        notifications.push(status, message, None);
        outcome
    }

    pub fn finish_forgot_password(
        &mut self,
        result: ApiResult<ApiResponse<()>>,
        notifications: &mut Notifications,
    ) {
        self.submitting = false;
        match result {
            Ok(response) => {
                if response.is_success() {
                    self.enter_mode(AuthMode::Login);
                }
                notifications.push(response.status, response.message, None);
            }
            Err(e) => log::error!("Error during password reset request: {}", e),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.toggle_registration(),
                KeyCode::Char('f') => self.toggle_forgot_password(),
                _ => {}
            }
            return ViewAction::None;
        }

        match key.code {
            KeyCode::Enter => ViewAction::SubmitAuth,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                ViewAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                ViewAction::None
            }
            _ => {
                let focus = self.focus;
                self.input_mut(focus).input(key);
                ViewAction::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::views::fixtures;
    use pinpics_types::Status;

    fn filled_form(mode: AuthMode) -> AuthForm {
        let mut form = AuthForm::new();
        form.mode = mode;
        form.username.insert_str("mira");
        form.email.insert_str("mira@example.com");
        form.password.insert_str("secret1");
        form
    }

    fn payload(user: User) -> AuthPayload {
        AuthPayload {
            token: "token-abc".to_string(),
            user,
        }
    }

    #[test]
    fn test_starts_in_registration() {
        let form = AuthForm::new();
        assert_eq!(form.mode, AuthMode::Registration);
        assert_eq!(form.fields().len(), 3);
    }

    #[test]
    fn test_toggles_clear_credentials_and_keep_email() {
        let mut form = filled_form(AuthMode::Registration);

        form.toggle_registration();
        assert_eq!(form.mode, AuthMode::Login);
        assert_eq!(form.value(AuthField::Username), "");
        assert_eq!(form.value(AuthField::Password), "");
        assert_eq!(form.value(AuthField::Email), "mira@example.com");

        form.toggle_forgot_password();
        assert_eq!(form.mode, AuthMode::ForgotPassword);
        assert_eq!(form.focus, AuthField::Email);

        form.toggle_forgot_password();
        assert_eq!(form.mode, AuthMode::Login);

        form.toggle_forgot_password();
        form.toggle_registration();
        assert_eq!(form.mode, AuthMode::Registration);
        assert_eq!(form.value(AuthField::Email), "mira@example.com");
    }

    #[test]
    fn test_submit_builds_request_per_mode() {
        let mut session = Session::default();

        let mut form = filled_form(AuthMode::Registration);
        assert_eq!(
            form.begin_submit(&mut session),
            Some(AuthRequest::Registration {
                name: "mira".to_string(),
                email: "mira@example.com".to_string(),
                password: "secret1".to_string(),
            })
        );
        assert!(!session.user_loading);

        let mut form = filled_form(AuthMode::ForgotPassword);
        assert_eq!(
            form.begin_submit(&mut session),
            Some(AuthRequest::ForgotPassword {
                email: "mira@example.com".to_string()
            })
        );
    }

    #[test]
    fn test_login_sets_loading_and_blocks_double_submit() {
        let mut session = Session::default();
        let mut form = filled_form(AuthMode::Login);

        assert!(matches!(
            form.begin_submit(&mut session),
            Some(AuthRequest::Login { .. })
        ));
        assert!(session.user_loading);
        assert!(form.begin_submit(&mut session).is_none());
    }

    #[test]
    fn test_registration_success_logs_in_and_closes() {
        let mut session = Session::default();
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::Registration);
        form.begin_submit(&mut session);

        let outcome = form.finish_registration(
            Ok(ApiResponse::success("Registration successful.", payload(fixtures::user(5, 0)))),
            &mut session,
            &mut notifications,
        );

        assert!(outcome.close_window);
        assert_eq!(outcome.token.as_deref(), Some("token-abc"));
        assert_eq!(session.user_id(), Some(5));
        assert_eq!(form.mode, AuthMode::Login);
        let toast = notifications.latest().unwrap();
        assert_eq!(toast.status, Status::Success);
        assert_eq!(toast.message, "Registration successful.");
    }

    #[test]
    fn test_registration_error_keeps_form_open() {
        let mut session = Session::default();
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::Registration);

        let outcome = form.finish_registration(
            Ok(ApiResponse::error("Email is already registered.")),
            &mut session,
            &mut notifications,
        );

        assert_eq!(outcome, AuthOutcome::default());
        assert_eq!(form.mode, AuthMode::Registration);
        assert!(!session.is_logged_in());
        assert_eq!(notifications.latest().unwrap().status, Status::Error);
    }

    #[test]
    fn test_login_prefers_fresh_user() {
        let mut session = Session::default();
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::Login);
        form.begin_submit(&mut session);

        let mut fresh = fixtures::user(5, 1);
        fresh.name = "mira-fresh".to_string();
        let outcome = form.finish_login(
            Ok(ApiResponse::success("Logged in.", payload(fixtures::user(5, 0)))),
            Some(Ok(ApiResponse::success("User loaded.", fresh))),
            &mut session,
            &mut notifications,
        );

        assert!(outcome.close_window);
        assert!(!session.user_loading);
        assert_eq!(session.user.as_ref().unwrap().name, "mira-fresh");
        assert_eq!(notifications.latest().unwrap().message, "Logged in.");
    }

    #[test]
    fn test_login_falls_back_to_payload_user() {
        let mut session = Session::default();
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::Login);

        form.finish_login(
            Ok(ApiResponse::success("Logged in.", payload(fixtures::user(5, 0)))),
            Some(Err(ApiError::Api("down".into()))),
            &mut session,
            &mut notifications,
        );
        assert_eq!(session.user_id(), Some(5));
    }

    #[test]
    fn test_transport_errors_are_swallowed() {
        let mut session = Session::default();
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::Login);
        form.begin_submit(&mut session);

        let outcome = form.finish_login(
            Err(ApiError::Api("down".into())),
            None,
            &mut session,
            &mut notifications,
        );
        assert_eq!(outcome, AuthOutcome::default());
        assert!(notifications.is_empty());
        assert!(!session.user_loading);
        assert!(!form.is_submitting());

        form.finish_forgot_password(Err(ApiError::Api("down".into())), &mut notifications);
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_forgot_password_success_returns_to_login() {
        let mut notifications = Notifications::new();
        let mut form = filled_form(AuthMode::ForgotPassword);

        form.finish_forgot_password(
            Ok(ApiResponse::ok("If that email is registered, a reset link is on its way.")),
            &mut notifications,
        );
        assert_eq!(form.mode, AuthMode::Login);
        assert_eq!(notifications.latest().unwrap().status, Status::Success);
    }

    #[test]
    fn test_keys_route_to_focused_field() {
        let mut form = AuthForm::new();
        form.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        form.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        form.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE));
        assert_eq!(form.value(AuthField::Username), "a");
        assert_eq!(form.value(AuthField::Email), "b");

        form.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(form.mode, AuthMode::Login);
        assert_eq!(
            form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            ViewAction::SubmitAuth
        );
    }
}
