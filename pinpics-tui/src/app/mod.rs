mod events;
mod handlers;

#[cfg(test)]
mod tests;

pub use events::AppEvent;

use std::future::Future;
use std::time::Instant;

use pinpics_types::{ApiResponse, User};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiClient, ApiResult};
use crate::config::{ConfigManager, SavedSession};
use crate::context::AppContext;
use crate::logging::LogConfig;
use crate::views::{AuthOutcome, AuthRequest, NewPost, ViewAction, WindowContent};
use crate::windows::{WindowId, WindowKind, WindowManager};
use crate::{log_api_call, log_window};

pub const LOGGED_OUT_MESSAGE: &str = "Logged out.";
pub const SETTINGS_LOGIN_MESSAGE: &str = "Please log in to change settings.";

/// Starts API calls in the background and routes their results back
///
/// Holds its own client clone so it can be used while a window is borrowed.
struct Requests {
    client: ApiClient,
    tx: UnboundedSender<AppEvent>,
}

impl Requests {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = task.await;
            if tx.send(event).is_err() {
                log::debug!("Event channel closed, dropping result");
            }
        });
    }

    fn restore_session(&self) {
        let client = self.client.clone();
        self.spawn(async move { AppEvent::SessionRestored(client.get_user().await) });
    }

    fn fetch_feed(&self, window: WindowId) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::FeedLoaded {
                window,
                result: client.fetch_posts().await,
            }
        });
    }

    fn fetch_post(&self, window: WindowId, post_id: i64) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::PostLoaded {
                window,
                result: client.fetch_post(post_id).await,
            }
        });
    }

    fn like(&self, window: WindowId, post_id: i64) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::LikeFinished {
                window,
                result: client.like_post(post_id).await,
            }
        });
    }

    fn comment(&self, window: WindowId, temp_id: i64, post_id: i64, text: String) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::CommentFinished {
                window,
                temp_id,
                result: client.upload_comment(post_id, text).await,
            }
        });
    }

    fn delete_post(&self, window: WindowId, post_id: i64) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::PostDeleted {
                window,
                post_id,
                result: client.delete_post(post_id).await,
            }
        });
    }

    fn auth(&self, window: WindowId, request: AuthRequest) {
        let mut client = self.client.clone();
        match request {
            AuthRequest::Registration {
                name,
                email,
                password,
            } => self.spawn(async move {
                AppEvent::Registered {
                    window,
                    result: client.registration(name, email, password).await,
                }
            }),
            AuthRequest::Login { username, password } => self.spawn(async move {
                let result = client.login(username, password).await;
                // The clone now carries the new token
                let user = match &result {
                    Ok(response) if response.is_success() => Some(client.get_user().await),
                    _ => None,
                };
                AppEvent::LoggedIn {
                    window,
                    result,
                    user,
                }
            }),
            AuthRequest::ForgotPassword { email } => self.spawn(async move {
                AppEvent::ForgotPasswordFinished {
                    window,
                    result: client.forgot_password(email).await,
                }
            }),
        }
    }

    fn create_post(&self, window: WindowId, new_post: NewPost) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::PostCreated {
                window,
                result: client
                    .create_post(new_post.name, new_post.description, new_post.images)
                    .await,
            }
        });
    }

    fn save_settings(&self, window: WindowId, bg_color: Option<String>) {
        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::SettingsSaved {
                window,
                result: client.update_settings(bg_color).await,
            }
        });
    }

    fn logout(&self) {
        let mut client = self.client.clone();
        self.spawn(async move { AppEvent::LoggedOut(client.logout().await) });
    }
}

/// Main application state
///
/// Owned by the UI loop. Network calls run in spawned tasks and report back
/// through [`AppEvent`]s, so all mutation happens in [`App::apply_event`] or
/// in a key handler.
pub struct App {
    pub running: bool,
    pub context: AppContext,
    pub api_client: ApiClient,
    pub log_config: LogConfig,
    /// Where the session token is persisted; `None` keeps it in memory only
    pub config_manager: Option<ConfigManager>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(server_url: impl Into<String>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            context: AppContext::new(),
            api_client: ApiClient::new(server_url),
            log_config: LogConfig::default(),
            config_manager: None,
            events_tx,
            events_rx,
        }
    }

    pub fn with_config(server_url: impl Into<String>, config_manager: ConfigManager) -> Self {
        let mut app = Self::new(server_url);
        app.config_manager = Some(config_manager);
        app
    }

    pub fn server_url(&self) -> &str {
        self.api_client.base_url()
    }

    fn requests(&self) -> Requests {
        Requests {
            client: self.api_client.clone(),
            tx: self.events_tx.clone(),
        }
    }

    /// Restore the persisted session for this server and open the feed
    pub fn start(&mut self) {
        let saved = self
            .config_manager
            .as_ref()
            .and_then(|config| match config.load_session() {
                Ok(saved) => saved,
                Err(e) => {
                    log::warn!("Could not read saved session: {:#}", e);
                    None
                }
            });

        if let Some(saved) = saved.filter(|s| s.server_url == self.server_url()) {
            log::info!("Restoring saved session for {}", saved.server_url);
            self.api_client.set_session_token(Some(saved.session_token));
            self.context.session.user_loading = true;
            log_api_call!(self.log_config, "GET /api/user (restore)");
            self.requests().restore_session();
        }

        self.open_path("/posts");
    }

    /// Drain finished background calls without blocking
    pub fn process_pending_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
            count += 1;
        }
        count
    }

    /// Wait for the next background result
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    /// Apply finished calls and expire notifications; once per loop turn
    pub fn tick(&mut self) {
        self.process_pending_events();
        let expired = self.context.notifications.expire(Instant::now());
        if expired > 0 {
            crate::log_notification!(self.log_config, "Expired {} notification(s)", expired);
        }
    }

    // Windows

    /// Open or focus the window for `path`, starting its first load
    pub fn open_path(&mut self, path: &str) -> Option<WindowId> {
        let opened = self.context.windows.open_window_by_path(path)?;
        log_window!(
            self.log_config,
            "{} {} (window {})",
            if opened.created { "Opened" } else { "Focused" },
            path,
            opened.id
        );
        if opened.created {
            self.load_window(opened.id);
        }
        Some(opened.id)
    }

    fn load_window(&mut self, id: WindowId) {
        let requests = self.requests();
        let user = self.context.session.user.clone();
        let Some(content) = content_mut(&mut self.context.windows, id) else {
            return;
        };
        match content {
            WindowContent::Posts(feed) => {
                feed.begin_refresh();
                log_api_call!(self.log_config, "GET /api/post (window {})", id);
                requests.fetch_feed(id);
            }
            WindowContent::PostDetail(view) => {
                if let Some(post_id) = view.begin_fetch() {
                    log_api_call!(self.log_config, "GET /api/post/{}", post_id);
                    requests.fetch_post(id, post_id);
                }
            }
            WindowContent::Settings(form) => form.sync_from(user.as_ref()),
            _ => {}
        }
    }

    pub fn close_window(&mut self, id: WindowId) {
        if self.context.windows.remove_window(id).is_some() {
            log_window!(self.log_config, "Closed window {}", id);
        }
    }

    /// Follow the newest notification that carries a link
    pub fn follow_notification_link(&mut self) {
        let Some((id, link)) = self
            .context
            .notifications
            .latest_link()
            .map(|(id, link)| (id, link.to_string()))
        else {
            return;
        };
        self.context.notifications.dismiss(id);
        self.open_path(&link);
    }

    /// Carry out what a view asked for
    pub fn perform(&mut self, window_id: WindowId, action: ViewAction) {
        let action = match action {
            ViewAction::None => return,
            ViewAction::Open(path) => {
                self.open_path(&path);
                return;
            }
            other => other,
        };

        let requests = self.requests();
        let log_config = &self.log_config;
        let ctx = &mut self.context;
        let Some(content) = content_mut(&mut ctx.windows, window_id) else {
            return;
        };

        match (action, content) {
            (ViewAction::Reload, WindowContent::Posts(feed)) => {
                feed.begin_refresh();
                log_api_call!(log_config, "GET /api/post (window {})", window_id);
                requests.fetch_feed(window_id);
            }
            (ViewAction::Reload, WindowContent::PostDetail(view)) => {
                if let Some(post_id) = view.begin_fetch() {
                    log_api_call!(log_config, "GET /api/post/{}", post_id);
                    requests.fetch_post(window_id, post_id);
                }
            }
            (ViewAction::ToggleLike, WindowContent::PostDetail(view)) => {
                if let Some(post_id) = view.begin_like(&ctx.session, &mut ctx.notifications) {
                    log_api_call!(log_config, "POST /api/post/{}/like", post_id);
                    requests.like(window_id, post_id);
                }
            }
            (ViewAction::SubmitComment, WindowContent::PostDetail(view)) => {
                let now_ms = chrono::Utc::now().timestamp_millis();
                if let Some(pending) =
                    view.begin_comment(&ctx.session, &mut ctx.notifications, now_ms)
                {
                    log_api_call!(log_config, "POST /api/post/{}/comment", pending.post_id);
                    requests.comment(window_id, pending.temp_id, pending.post_id, pending.text);
                }
            }
            (ViewAction::DeletePost, WindowContent::PostDetail(view)) => {
                if let Some(post_id) = view.begin_delete(&ctx.session, &mut ctx.notifications) {
                    log_api_call!(log_config, "DELETE /api/post/{}", post_id);
                    requests.delete_post(window_id, post_id);
                }
            }
            (ViewAction::ZoomImage, WindowContent::PostDetail(view)) => {
                view.zoom(&mut ctx.modals);
            }
            (ViewAction::SubmitAuth, WindowContent::Authentication(form)) => {
                if let Some(request) = form.begin_submit(&mut ctx.session) {
                    log_api_call!(log_config, "Auth request from window {}", window_id);
                    requests.auth(window_id, request);
                }
            }
            (ViewAction::SubmitPost, WindowContent::CreatePost(form)) => {
                if let Some(new_post) = form.begin_submit(&mut ctx.notifications) {
                    log_api_call!(
                        log_config,
                        "POST /api/post with {} image(s)",
                        new_post.images.len()
                    );
                    requests.create_post(window_id, new_post);
                }
            }
            (ViewAction::SaveSettings, WindowContent::Settings(form)) => {
                if !ctx.session.is_logged_in() {
                    ctx.notifications
                        .error(SETTINGS_LOGIN_MESSAGE, Some("/authentication"));
                } else if let Some(bg_color) = form.begin_save(&ctx.session, &mut ctx.notifications)
                {
                    log_api_call!(log_config, "PUT /api/user/settings");
                    requests.save_settings(window_id, bg_color);
                }
            }
            (action, _) => {
                log::debug!("Ignoring {:?} for window {}", action, window_id);
            }
        }
    }

    /// Drop the session locally and tell the server
    pub fn logout(&mut self) {
        if !self.context.session.is_logged_in() {
            return;
        }

        log_api_call!(self.log_config, "POST /api/user/logout");
        self.requests().logout();

        self.api_client.set_session_token(None);
        self.forget_saved_session();
        self.context.session.clear();
        self.context.notifications.success(LOGGED_OUT_MESSAGE);

        let member_only: Vec<WindowId> = self
            .context
            .windows
            .iter()
            .filter(|w| matches!(w.kind, WindowKind::CreatePost | WindowKind::Settings))
            .map(|w| w.id)
            .collect();
        for id in member_only {
            self.close_window(id);
        }
        self.on_session_changed();
    }

    fn remember_session(&mut self, token: String) {
        self.api_client.set_session_token(Some(token.clone()));
        if let Some(config) = &self.config_manager {
            let saved = SavedSession {
                session_token: token,
                server_url: self.api_client.base_url().to_string(),
            };
            if let Err(e) = config.save_session(&saved) {
                log::error!("Failed to save session: {:#}", e);
            }
        }
    }

    fn forget_saved_session(&self) {
        if let Some(config) = &self.config_manager {
            if let Err(e) = config.delete_session() {
                log::error!("Failed to delete saved session: {:#}", e);
            }
        }
    }

    /// Re-derive per-user view state after login, logout or a profile change
    fn on_session_changed(&mut self) {
        let user = self.context.session.user.clone();
        for window in self.context.windows.iter_mut() {
            match &mut window.content {
                WindowContent::PostDetail(view) => view.sync_viewer(user.as_ref()),
                WindowContent::Settings(form) => form.sync_from(user.as_ref()),
                _ => {}
            }
        }
    }

    // Results

    pub fn apply_event(&mut self, event: AppEvent) {
        log_api_call!(self.log_config, "Applying {}", event.name());
        let ctx = &mut self.context;

        match event {
            AppEvent::SessionRestored(result) => self.finish_restore(result),
            AppEvent::FeedLoaded { window, result } => {
                if let Some(WindowContent::Posts(feed)) = content_mut(&mut ctx.windows, window) {
                    feed.finish_refresh(result, &mut ctx.notifications);
                }
            }
            AppEvent::PostLoaded { window, result } => {
                let viewer = ctx.session.user.as_ref();
                if let Some(WindowContent::PostDetail(view)) =
                    content_mut(&mut ctx.windows, window)
                {
                    view.finish_fetch(result, viewer, &mut ctx.notifications);
                }
            }
            AppEvent::LikeFinished { window, result } => {
                if let Some(WindowContent::PostDetail(view)) =
                    content_mut(&mut ctx.windows, window)
                {
                    view.finish_like(result, &mut ctx.notifications);
                }
            }
            AppEvent::CommentFinished {
                window,
                temp_id,
                result,
            } => {
                if let Some(WindowContent::PostDetail(view)) =
                    content_mut(&mut ctx.windows, window)
                {
                    view.finish_comment(temp_id, result, &mut ctx.notifications);
                }
            }
            AppEvent::PostDeleted {
                window,
                post_id,
                result,
            } => self.finish_delete(window, post_id, result),
            AppEvent::Registered { window, result } => {
                let outcome = match content_mut(&mut ctx.windows, window) {
                    Some(WindowContent::Authentication(form)) => {
                        form.finish_registration(result, &mut ctx.session, &mut ctx.notifications)
                    }
                    _ => match result.ok().and_then(|r| r.into_success_data()) {
                        Some(payload) => {
                            ctx.session.set_user(payload.user);
                            AuthOutcome {
                                close_window: false,
                                token: Some(payload.token),
                            }
                        }
                        None => return,
                    },
                };
                self.finish_auth(window, outcome);
            }
            AppEvent::LoggedIn {
                window,
                result,
                user,
            } => {
                let outcome = match content_mut(&mut ctx.windows, window) {
                    Some(WindowContent::Authentication(form)) => form.finish_login(
                        result,
                        user,
                        &mut ctx.session,
                        &mut ctx.notifications,
                    ),
                    // The form was closed mid-request; the login still counts
                    _ => {
                        ctx.session.user_loading = false;
                        match result.ok().and_then(|r| r.into_success_data()) {
                            Some(payload) => {
                                ctx.session.set_user(payload.user);
                                AuthOutcome {
                                    close_window: false,
                                    token: Some(payload.token),
                                }
                            }
                            None => return,
                        }
                    }
                };
                self.finish_auth(window, outcome);
            }
            AppEvent::ForgotPasswordFinished { window, result } => {
                if let Some(WindowContent::Authentication(form)) =
                    content_mut(&mut ctx.windows, window)
                {
                    form.finish_forgot_password(result, &mut ctx.notifications);
                }
            }
            AppEvent::PostCreated { window, result } => {
                let created = match content_mut(&mut ctx.windows, window) {
                    Some(WindowContent::CreatePost(form)) => {
                        form.finish_submit(result, &mut ctx.notifications)
                    }
                    _ => None,
                };
                if created.is_some() {
                    self.close_window(window);
                    self.refresh_feeds();
                }
            }
            AppEvent::SettingsSaved { window, result } => {
                match content_mut(&mut ctx.windows, window) {
                    Some(WindowContent::Settings(form)) => {
                        form.finish_save(result, &mut ctx.session, &mut ctx.notifications)
                    }
                    _ => {
                        if let Some(user) = result.ok().and_then(|r| r.into_success_data()) {
                            ctx.session.set_user(user);
                        }
                    }
                }
                self.on_session_changed();
            }
            AppEvent::LoggedOut(result) => match result {
                Ok(response) => log::debug!("Server logout: {}", response.message),
                Err(e) => log::warn!("Server logout failed: {}", e),
            },
        }
    }

    fn finish_restore(&mut self, result: ApiResult<ApiResponse<User>>) {
        self.context.session.user_loading = false;
        match result {
            Ok(response) => match response.into_success_data() {
                Some(user) => {
                    self.context.session.set_user(user);
                    self.on_session_changed();
                }
                None => {
                    log::info!("Saved session is no longer valid");
                    self.api_client.set_session_token(None);
                    self.forget_saved_session();
                }
            },
            // Keep the token, the server may just be down
            Err(e) => log::warn!("Could not restore session: {}", e),
        }
    }

    fn finish_auth(&mut self, window: WindowId, outcome: AuthOutcome) {
        if let Some(token) = outcome.token {
            self.remember_session(token);
        }
        if outcome.close_window {
            self.close_window(window);
        }
        self.on_session_changed();
    }

    fn finish_delete(
        &mut self,
        window: WindowId,
        post_id: i64,
        result: ApiResult<ApiResponse<()>>,
    ) {
        let ctx = &mut self.context;
        let deleted = match content_mut(&mut ctx.windows, window) {
            Some(WindowContent::PostDetail(view)) => {
                view.finish_delete(result, &mut ctx.notifications)
            }
            _ => result.map(|r| r.is_success()).unwrap_or(false),
        };
        if deleted {
            for window in self.context.windows.iter_mut() {
                if let WindowContent::Posts(feed) = &mut window.content {
                    feed.remove_post(post_id);
                }
            }
        }
    }

    fn refresh_feeds(&mut self) {
        let feeds: Vec<WindowId> = self
            .context
            .windows
            .iter()
            .filter(|w| w.kind == WindowKind::Posts)
            .map(|w| w.id)
            .collect();
        for id in feeds {
            self.perform(id, ViewAction::Reload);
        }
    }
}

fn content_mut(windows: &mut WindowManager, window: WindowId) -> Option<&mut WindowContent> {
    windows.get_mut(window).map(|w| &mut w.content)
}
