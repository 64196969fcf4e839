use pinpics_types::{ApiResponse, AuthPayload, Comment, FullPost, LikeStatus, PostSummary, User};

use crate::api::ApiResult;
use crate::windows::WindowId;

/// Results of background API calls, applied on the UI loop
///
/// Window-scoped results carry the id of the window that asked, so a reply
/// for a window closed in the meantime is simply dropped.
#[derive(Debug)]
pub enum AppEvent {
    SessionRestored(ApiResult<ApiResponse<User>>),
    FeedLoaded {
        window: WindowId,
        result: ApiResult<ApiResponse<Vec<PostSummary>>>,
    },
    PostLoaded {
        window: WindowId,
        result: ApiResult<ApiResponse<FullPost>>,
    },
    LikeFinished {
        window: WindowId,
        result: ApiResult<ApiResponse<LikeStatus>>,
    },
    CommentFinished {
        window: WindowId,
        temp_id: i64,
        result: ApiResult<ApiResponse<Comment>>,
    },
    PostDeleted {
        window: WindowId,
        post_id: i64,
        result: ApiResult<ApiResponse<()>>,
    },
    Registered {
        window: WindowId,
        result: ApiResult<ApiResponse<AuthPayload>>,
    },
    LoggedIn {
        window: WindowId,
        result: ApiResult<ApiResponse<AuthPayload>>,
        /// Follow-up `get_user`, only sent when the login succeeded
        user: Option<ApiResult<ApiResponse<User>>>,
    },
    ForgotPasswordFinished {
        window: WindowId,
        result: ApiResult<ApiResponse<()>>,
    },
    PostCreated {
        window: WindowId,
        result: ApiResult<ApiResponse<FullPost>>,
    },
    SettingsSaved {
        window: WindowId,
        result: ApiResult<ApiResponse<User>>,
    },
    LoggedOut(ApiResult<ApiResponse<()>>),
}

impl AppEvent {
    /// Short name for the api_calls log
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::SessionRestored(_) => "session_restored",
            AppEvent::FeedLoaded { .. } => "feed_loaded",
            AppEvent::PostLoaded { .. } => "post_loaded",
            AppEvent::LikeFinished { .. } => "like_finished",
            AppEvent::CommentFinished { .. } => "comment_finished",
            AppEvent::PostDeleted { .. } => "post_deleted",
            AppEvent::Registered { .. } => "registered",
            AppEvent::LoggedIn { .. } => "logged_in",
            AppEvent::ForgotPasswordFinished { .. } => "forgot_password_finished",
            AppEvent::PostCreated { .. } => "post_created",
            AppEvent::SettingsSaved { .. } => "settings_saved",
            AppEvent::LoggedOut(_) => "logged_out",
        }
    }
}
