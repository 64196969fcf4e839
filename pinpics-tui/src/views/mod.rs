//! Window contents
//!
//! Views never talk to the network. Key handling returns a [`ViewAction`] and
//! the app starts the request; results come back through the `finish_*`
//! methods on the UI loop.
pub mod auth_form;
pub mod create_post;
pub mod feed;
pub mod footer;
pub mod post_detail;
pub mod settings;

pub use auth_form::{AuthForm, AuthMode, AuthOutcome, AuthRequest};
pub use create_post::{CreatePostForm, NewPost};
pub use feed::{FeedState, FeedView};
pub use footer::{dock_items, DockItem};
pub use post_detail::{DetailPane, PendingComment, PostDetailView, PostState};
pub use settings::SettingsForm;

use tui_textarea::TextArea;

use crate::windows::{RouteMatch, WindowKind};

/// What a key press asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    None,
    /// Open (or focus) the window for a path
    Open(String),
    SubmitAuth,
    ToggleLike,
    SubmitComment,
    DeletePost,
    ZoomImage,
    Reload,
    SubmitPost,
    SaveSettings,
}

/// The view hosted by a window
#[derive(Debug)]
pub enum WindowContent {
    Authentication(AuthForm),
    Posts(FeedView),
    CreatePost(CreatePostForm),
    Settings(SettingsForm),
    PostDetail(PostDetailView),
    NotFound { path: String },
}

impl WindowContent {
    pub fn for_route(route: &RouteMatch<'_>, path: &str) -> Self {
        match route.entry.kind {
            WindowKind::Authentication => WindowContent::Authentication(AuthForm::new()),
            WindowKind::Posts => WindowContent::Posts(FeedView::new()),
            WindowKind::CreatePost => WindowContent::CreatePost(CreatePostForm::new()),
            WindowKind::Settings => WindowContent::Settings(SettingsForm::new()),
            WindowKind::PostDetail => match route.param("id").and_then(|id| id.parse().ok()) {
                Some(post_id) => WindowContent::PostDetail(PostDetailView::new(post_id)),
                None => WindowContent::NotFound {
                    path: path.to_string(),
                },
            },
            WindowKind::NotFound => WindowContent::NotFound {
                path: path.to_string(),
            },
        }
    }
}

/// One-line input with a placeholder
pub(crate) fn single_line(placeholder: &str) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(placeholder.to_string());
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea
}

/// Like [`single_line`] but echoes `•` instead of the typed characters
pub(crate) fn masked_line(placeholder: &str) -> TextArea<'static> {
    let mut textarea = single_line(placeholder);
    textarea.set_mask_char('\u{2022}');
    textarea
}

pub(crate) fn text_of(textarea: &TextArea<'_>) -> String {
    textarea.lines().join("\n")
}

/// Replace the content while keeping placeholder and styling
pub(crate) fn set_text(textarea: &mut TextArea<'static>, text: &str) {
    textarea.select_all();
    textarea.cut();
    textarea.insert_str(text);
}

pub(crate) fn clear(textarea: &mut TextArea<'static>) {
    set_text(textarea, "");
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::Registry;

    #[test]
    fn test_content_for_post_route() {
        let route = Registry::standard().unwrap().resolve("/post/7").unwrap();
        match WindowContent::for_route(&route, "/post/7") {
            WindowContent::PostDetail(view) => assert_eq!(view.post_id, 7),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_post_id_is_not_found() {
        let route = Registry::standard().unwrap().resolve("/post/abc").unwrap();
        assert!(matches!(
            WindowContent::for_route(&route, "/post/abc"),
            WindowContent::NotFound { .. }
        ));
    }

    #[test]
    fn test_set_text_replaces_content() {
        let mut input = single_line("Email");
        input.insert_str("old@example.com");
        set_text(&mut input, "new@example.com");
        assert_eq!(text_of(&input), "new@example.com");
        clear(&mut input);
        assert_eq!(text_of(&input), "");
    }
}
