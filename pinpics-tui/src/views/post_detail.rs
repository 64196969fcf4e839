use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pinpics_types::{ApiResponse, Author, Comment, FullPost, Like, LikeStatus, User};
use tui_textarea::TextArea;

use super::{clear, single_line, text_of, ViewAction};
use crate::api::{ApiError, ApiResult};
use crate::context::{Modal, Modals, Notifications, Session};

pub const LOGIN_LINK: &str = "/authentication";

pub const LIKE_LOGIN_MESSAGE: &str = "You have to be logged in to like posts.";
pub const LIKE_FAILED_MESSAGE: &str = "Could not update like.";
pub const COMMENT_LOGIN_MESSAGE: &str = "Please log in to add a comment.";
pub const COMMENT_EMPTY_MESSAGE: &str = "Please enter a comment first.";
pub const COMMENT_FAILED_MESSAGE: &str = "Failed to add comment.";
pub const DELETE_DENIED_MESSAGE: &str = "You are not allowed to delete posts.";
pub const DELETE_SUCCESS_MESSAGE: &str = "Post deleted successfully.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete post.";
pub const FETCH_FAILED_MESSAGE: &str = "Could not fetch post.";

#[derive(Debug, Clone, PartialEq)]
pub enum PostState {
    Loading,
    Loaded(Box<FullPost>),
    NotFound,
    Error(String),
    /// Removed on the server; the window only shows a tombstone
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPane {
    Image,
    Details,
    Comments,
}

impl DetailPane {
    fn next(self) -> Self {
        match self {
            DetailPane::Image => DetailPane::Details,
            DetailPane::Details => DetailPane::Comments,
            DetailPane::Comments => DetailPane::Image,
        }
    }
}

/// Liked flag and count captured before an optimistic flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LikeSnapshot {
    liked: bool,
    like_count: i64,
    user_id: i64,
}

/// Comment shown optimistically while the upload runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComment {
    pub temp_id: i64,
    pub post_id: i64,
    pub text: String,
}

/// Detail window for a single post
#[derive(Debug)]
pub struct PostDetailView {
    pub post_id: i64,
    pub state: PostState,
    pub liked: bool,
    pub like_count: i64,
    pub comments: Vec<Comment>,
    pub image_index: usize,
    pub pane: DetailPane,
    pub comment_input: TextArea<'static>,
    pub comment_scroll: usize,
    /// Set by the first `d`, a second `d` confirms
    pub delete_armed: bool,
    like_in_flight: Option<LikeSnapshot>,
    delete_in_flight: bool,
    last_temp_id: i64,
}

impl PostDetailView {
    pub fn new(post_id: i64) -> Self {
        Self {
            post_id,
            state: PostState::Loading,
            liked: false,
            like_count: 0,
            comments: Vec::new(),
            image_index: 0,
            pane: DetailPane::Image,
            comment_input: single_line("Write a comment and press Enter"),
            comment_scroll: 0,
            delete_armed: false,
            like_in_flight: None,
            delete_in_flight: false,
            last_temp_id: 0,
        }
    }

    pub fn post(&self) -> Option<&FullPost> {
        match &self.state {
            PostState::Loaded(post) => Some(post),
            _ => None,
        }
    }

    pub fn is_like_in_flight(&self) -> bool {
        self.like_in_flight.is_some()
    }

    /// Back to `Loading` for a refetch
    pub fn begin_fetch(&mut self) -> Option<i64> {
        if self.state == PostState::Deleted {
            return None;
        }
        self.state = PostState::Loading;
        Some(self.post_id)
    }

    pub fn finish_fetch(
        &mut self,
        result: ApiResult<ApiResponse<FullPost>>,
        viewer: Option<&User>,
        notifications: &mut Notifications,
    ) {
        match result {
            Ok(response) if response.is_success() => match response.data {
                Some(post) => self.seed(post, viewer),
                None => {
                    log::warn!("Post {} reply had no data", self.post_id);
                    self.state = PostState::Error(FETCH_FAILED_MESSAGE.to_string());
                }
            },
            Ok(response) => {
                log::debug!("Post {} not available: {}", self.post_id, response.message);
                self.state = PostState::NotFound;
            }
            Err(ApiError::NotFound(_)) => self.state = PostState::NotFound,
            Err(e) => {
                log::error!("Failed to fetch post {}: {}", self.post_id, e);
                self.state = PostState::Error(e.to_string());
                notifications.error(FETCH_FAILED_MESSAGE, None);
            }
        }
    }

    fn seed(&mut self, post: FullPost, viewer: Option<&User>) {
        // An outstanding like keeps its optimistic values and its guard
        // until its own reply settles them
        if self.like_in_flight.is_none() {
            self.like_count = post.like_count;
            self.liked = viewer.is_some_and(|user| post.is_liked_by(user.id));
        }
        self.comments = post.comments.clone();
        self.image_index = 0;
        self.state = PostState::Loaded(Box::new(post));
    }

    /// Recompute the liked flag after the session user changed
    pub fn sync_viewer(&mut self, viewer: Option<&User>) {
        if self.like_in_flight.is_some() {
            return;
        }
        if let PostState::Loaded(post) = &self.state {
            self.liked = viewer.is_some_and(|user| post.is_liked_by(user.id));
        }
    }

    // Likes

    /// Flip the like optimistically; returns the post id to send
    ///
    /// Returns `None` when the viewer is anonymous or a like request is
    /// already outstanding.
    pub fn begin_like(
        &mut self,
        session: &Session,
        notifications: &mut Notifications,
    ) -> Option<i64> {
        let Some(user_id) = session.user_id() else {
            notifications.error(LIKE_LOGIN_MESSAGE, Some(LOGIN_LINK));
            return None;
        };
        if self.like_in_flight.is_some() || self.post().is_none() {
            return None;
        }

        self.like_in_flight = Some(LikeSnapshot {
            liked: self.liked,
            like_count: self.like_count,
            user_id,
        });
        self.liked = !self.liked;
        self.like_count += if self.liked { 1 } else { -1 };
        Some(self.post_id)
    }

    pub fn finish_like(
        &mut self,
        result: ApiResult<ApiResponse<LikeStatus>>,
        notifications: &mut Notifications,
    ) {
        let Some(snapshot) = self.like_in_flight.take() else {
            return;
        };

        let confirmed = match result {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                log::warn!("Like on post {} rejected: {}", self.post_id, response.message);
                false
            }
            Err(e) => {
                log::error!("Like on post {} failed: {}", self.post_id, e);
                false
            }
        };

        if confirmed {
            // Keep the optimistic values; record the viewer's like so
            // sync_viewer agrees with them
            let liked = self.liked;
            let post_id = self.post_id;
            if let PostState::Loaded(post) = &mut self.state {
                post.likes.retain(|like| like.user_id != snapshot.user_id);
                if liked {
                    post.likes.push(Like {
                        user_id: snapshot.user_id,
                        post_id,
                    });
                }
            }
        } else {
            self.liked = snapshot.liked;
            self.like_count = snapshot.like_count;
            notifications.error(LIKE_FAILED_MESSAGE, None);
        }
    }

    // Comments

    fn next_temp_id(&mut self, now_ms: i64) -> i64 {
        self.last_temp_id = now_ms.max(self.last_temp_id + 1);
        self.last_temp_id
    }

    /// Append the typed comment under a temporary id
    pub fn begin_comment(
        &mut self,
        session: &Session,
        notifications: &mut Notifications,
        now_ms: i64,
    ) -> Option<PendingComment> {
        let Some(user) = session.user.as_ref() else {
            notifications.error(COMMENT_LOGIN_MESSAGE, Some(LOGIN_LINK));
            return None;
        };

        let text = text_of(&self.comment_input).trim().to_string();
        if text.is_empty() {
            notifications.error(COMMENT_EMPTY_MESSAGE, None);
            return None;
        }
        if self.post().is_none() {
            return None;
        }

        let temp_id = self.next_temp_id(now_ms);
        self.comments.push(Comment {
            id: temp_id,
            post_id: self.post_id,
            user_id: user.id,
            author: Author::from(user),
            comment: text.clone(),
            picpath: None,
            created_at: chrono::Utc::now(),
        });
        clear(&mut self.comment_input);

        Some(PendingComment {
            temp_id,
            post_id: self.post_id,
            text,
        })
    }

    pub fn finish_comment(
        &mut self,
        temp_id: i64,
        result: ApiResult<ApiResponse<Comment>>,
        notifications: &mut Notifications,
    ) {
        match result {
            Ok(response) if response.is_success() => {
                let message = response.message.clone();
                match response.data {
                    Some(saved) => {
                        if let Some(slot) = self.comments.iter_mut().find(|c| c.id == temp_id) {
                            *slot = saved;
                        }
                    }
                    None => log::warn!("Comment reply for post {} had no data", self.post_id),
                }
                notifications.success(message);
            }
            Ok(response) => {
                log::warn!("Comment on post {} rejected: {}", self.post_id, response.message);
                self.comments.retain(|c| c.id != temp_id);
                notifications.error(COMMENT_FAILED_MESSAGE, None);
            }
            Err(e) => {
                log::error!("Comment on post {} failed: {}", self.post_id, e);
                self.comments.retain(|c| c.id != temp_id);
                notifications.error(COMMENT_FAILED_MESSAGE, None);
            }
        }
    }

    // Carousel

    pub fn image_count(&self) -> usize {
        self.post().map_or(0, |post| post.images.len())
    }

    pub fn next_image(&mut self) {
        let count = self.image_count();
        if count > 0 {
            self.image_index = (self.image_index + 1) % count;
        }
    }

    pub fn prev_image(&mut self) {
        let count = self.image_count();
        if count > 0 {
            self.image_index = (self.image_index + count - 1) % count;
        }
    }

    pub fn current_image_url(&self) -> Option<&str> {
        self.post()
            .and_then(|post| post.images.get(self.image_index))
            .map(|image| image.picpath.as_str())
    }

    /// Open the current image full screen
    pub fn zoom(&self, modals: &mut Modals) -> bool {
        match self.current_image_url() {
            Some(url) => {
                modals.open(Modal::FullScreenImage {
                    image_url: url.to_string(),
                });
                true
            }
            None => false,
        }
    }

    // Deletion

    pub fn can_delete(&self, session: &Session) -> bool {
        session.can_delete_posts() && self.post().is_some()
    }

    pub fn begin_delete(
        &mut self,
        session: &Session,
        notifications: &mut Notifications,
    ) -> Option<i64> {
        self.delete_armed = false;
        if !session.can_delete_posts() {
            notifications.error(DELETE_DENIED_MESSAGE, None);
            return None;
        }
        if self.delete_in_flight || self.post().is_none() {
            return None;
        }
        self.delete_in_flight = true;
        Some(self.post_id)
    }

    /// The view only leaves `Loaded` once the server confirmed
    pub fn finish_delete(
        &mut self,
        result: ApiResult<ApiResponse<()>>,
        notifications: &mut Notifications,
    ) -> bool {
        self.delete_in_flight = false;
        match result {
            Ok(response) if response.is_success() => {
                self.state = PostState::Deleted;
                self.comments.clear();
                notifications.success(DELETE_SUCCESS_MESSAGE);
                true
            }
            Ok(response) => {
                log::warn!("Delete of post {} rejected: {}", self.post_id, response.message);
                notifications.error(DELETE_FAILED_MESSAGE, None);
                false
            }
            Err(e) => {
                log::error!("Delete of post {} failed: {}", self.post_id, e);
                notifications.error(DELETE_FAILED_MESSAGE, None);
                false
            }
        }
    }

    pub fn cycle_pane(&mut self) {
        self.pane = self.pane.next();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if key.code == KeyCode::Tab {
            self.delete_armed = false;
            self.cycle_pane();
            return ViewAction::None;
        }

        if self.pane == DetailPane::Comments {
            return match key.code {
                KeyCode::Enter => ViewAction::SubmitComment,
                KeyCode::Esc => {
                    self.pane = DetailPane::Details;
                    ViewAction::None
                }
                KeyCode::PageUp => {
                    self.comment_scroll = self.comment_scroll.saturating_sub(1);
                    ViewAction::None
                }
                KeyCode::PageDown => {
                    if self.comment_scroll + 1 < self.comments.len() {
                        self.comment_scroll += 1;
                    }
                    ViewAction::None
                }
                // Single line; the box scrolls sideways instead of wrapping
                _ => {
                    self.comment_input.input(key);
                    ViewAction::None
                }
            };
        }

        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return ViewAction::None;
        }

        let armed = std::mem::take(&mut self.delete_armed);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.prev_image();
                ViewAction::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.next_image();
                ViewAction::None
            }
            KeyCode::Char('z') | KeyCode::Enter => ViewAction::ZoomImage,
            KeyCode::Char(' ') | KeyCode::Char('L') => ViewAction::ToggleLike,
            KeyCode::Char('c') => {
                self.pane = DetailPane::Comments;
                ViewAction::None
            }
            KeyCode::Char('r') => ViewAction::Reload,
            KeyCode::Char('d') if armed => ViewAction::DeletePost,
            KeyCode::Char('d') => {
                self.delete_armed = true;
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }
}
