use crossterm::event::{KeyCode, KeyEvent};
use pinpics_types::{ApiResponse, PostSummary};
use ratatui::widgets::ListState;

use super::ViewAction;
use crate::api::ApiResult;
use crate::context::Notifications;

pub const FEED_FAILED_MESSAGE: &str = "Could not load posts.";

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Loaded,
    Error(String),
}

/// Newest-first list of posts
#[derive(Debug)]
pub struct FeedView {
    pub state: FeedState,
    pub posts: Vec<PostSummary>,
    pub list_state: ListState,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            state: FeedState::Loading,
            posts: Vec::new(),
            list_state: ListState::default(),
        }
    }

    pub fn begin_refresh(&mut self) {
        self.state = FeedState::Loading;
    }

    pub fn finish_refresh(
        &mut self,
        result: ApiResult<ApiResponse<Vec<PostSummary>>>,
        notifications: &mut Notifications,
    ) {
        match result {
            Ok(response) if response.is_success() => {
                let selected_id = self.selected().map(|p| p.id);
                self.posts = response.data.unwrap_or_default();
                self.state = FeedState::Loaded;

                // Keep the selection on the same post across refreshes
                let index = selected_id
                    .and_then(|id| self.posts.iter().position(|p| p.id == id))
                    .or(if self.posts.is_empty() { None } else { Some(0) });
                self.list_state.select(index);
            }
            Ok(response) => {
                self.state = FeedState::Error(response.message.clone());
                notifications.push(response.status, response.message, None);
            }
            Err(e) => {
                log::error!("Failed to load posts: {}", e);
                self.state = FeedState::Error(e.to_string());
                notifications.error(FEED_FAILED_MESSAGE, None);
            }
        }
    }

    pub fn selected(&self) -> Option<&PostSummary> {
        self.list_state.selected().and_then(|i| self.posts.get(i))
    }

    /// Drop a post that was deleted elsewhere
    pub fn remove_post(&mut self, post_id: i64) {
        self.posts.retain(|p| p.id != post_id);
        match self.list_state.selected() {
            Some(_) if self.posts.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.posts.len() => self.list_state.select(Some(self.posts.len() - 1)),
            _ => {}
        }
    }

    pub fn select_next(&mut self) {
        if self.posts.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < self.posts.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.posts.is_empty() {
            return;
        }
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                ViewAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                ViewAction::None
            }
            KeyCode::Enter => match self.selected() {
                Some(post) => ViewAction::Open(format!("/post/{}", post.id)),
                None => ViewAction::None,
            },
            KeyCode::Char('r') => ViewAction::Reload,
            _ => ViewAction::None,
        }
    }
}
