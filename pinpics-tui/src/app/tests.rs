use super::*;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pinpics_types::{Author, AuthPayload, FullPost, PostSummary, Status};

use crate::api::ApiError;
use crate::context::Modal;
use crate::views::fixtures;
use crate::views::post_detail::LIKE_LOGIN_MESSAGE;
use crate::views::{PostDetailView, PostState};

/// Nothing listens here, so spawned requests fail fast
const DEAD_SERVER: &str = "http://127.0.0.1:9";

/// Helper to create a KeyEvent
fn key_event(code: KeyCode) -> KeyEvent {
    let mut event = KeyEvent::new(code, KeyModifiers::empty());
    event.kind = KeyEventKind::Press;
    event
}

fn ctrl(c: char) -> KeyEvent {
    let mut event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
    event.kind = KeyEventKind::Press;
    event
}

fn summary(id: i64) -> PostSummary {
    let post = fixtures::post(id, 1, 0, vec![]);
    PostSummary {
        id,
        name: post.name,
        description: post.description,
        author: post.author,
        cover: None,
        created_at: post.created_at,
        like_count: 0,
        comment_count: 0,
    }
}

fn logged_in_app(banana_level: i32) -> App {
    let mut app = App::new(DEAD_SERVER);
    app.context
        .session
        .set_user(fixtures::user(7, banana_level));
    app
}

fn window_for(app: &App, path: &str) -> WindowId {
    app.context.windows.find_by_path(path).unwrap()
}

fn detail<'a>(app: &'a App, path: &str) -> &'a PostDetailView {
    match &app.context.windows.get(window_for(app, path)).unwrap().content {
        WindowContent::PostDetail(view) => view,
        other => panic!("expected a post detail view, got {:?}", other),
    }
}

fn load_post(app: &mut App, post: FullPost) -> WindowId {
    let path = format!("/post/{}", post.id);
    let window = app.open_path(&path).unwrap();
    app.apply_event(AppEvent::PostLoaded {
        window,
        result: Ok(ApiResponse::success("ok", post)),
    });
    window
}

#[tokio::test]
async fn test_feed_loads_into_posts_window() {
    let mut app = App::new(DEAD_SERVER);
    let window = app.open_path("/posts").unwrap();

    app.apply_event(AppEvent::FeedLoaded {
        window,
        result: Ok(ApiResponse::success("ok", vec![summary(2), summary(1)])),
    });

    match &app.context.windows.get(window).unwrap().content {
        WindowContent::Posts(feed) => {
            assert_eq!(feed.posts.len(), 2);
            assert_eq!(feed.selected().map(|p| p.id), Some(2));
        }
        other => panic!("expected posts, got {:?}", other),
    }
}

#[tokio::test]
async fn test_enter_in_feed_opens_post_window() {
    let mut app = App::new(DEAD_SERVER);
    let window = app.open_path("/posts").unwrap();
    app.apply_event(AppEvent::FeedLoaded {
        window,
        result: Ok(ApiResponse::success("ok", vec![summary(42)])),
    });

    app.handle_key_event(key_event(KeyCode::Enter));

    let focused = app.context.windows.focused().unwrap();
    assert_eq!(focused.path, "/post/42");
    assert_eq!(focused.title, "Post #42");
    assert_eq!(app.context.windows.len(), 2);
}

#[tokio::test]
async fn test_reopening_path_focuses_without_reloading() {
    let mut app = App::new(DEAD_SERVER);
    let post = load_post(&mut app, fixtures::post(3, 2, 0, vec![]));
    app.open_path("/authentication");

    assert_eq!(app.open_path("/post/3"), Some(post));
    assert!(matches!(detail(&app, "/post/3").state, PostState::Loaded(_)));
}

#[test]
fn test_result_for_closed_window_is_dropped() {
    let mut app = App::new(DEAD_SERVER);
    app.apply_event(AppEvent::PostLoaded {
        window: 99,
        result: Ok(ApiResponse::success("ok", fixtures::post(1, 1, 0, vec![]))),
    });
    assert!(app.context.windows.is_empty());
    assert!(app.context.notifications.is_empty());
}

#[tokio::test]
async fn test_like_requires_login() {
    let mut app = App::new(DEAD_SERVER);
    let window = load_post(&mut app, fixtures::post(5, 1, 3, vec![]));

    app.perform(window, ViewAction::ToggleLike);

    let toast = app.context.notifications.latest().unwrap();
    assert_eq!(toast.message, LIKE_LOGIN_MESSAGE);
    assert_eq!(toast.link_to.as_deref(), Some("/authentication"));
    assert_eq!(detail(&app, "/post/5").like_count, 3);
}

#[tokio::test]
async fn test_like_is_optimistic_then_reverted_on_failure() {
    let mut app = logged_in_app(0);
    let window = load_post(&mut app, fixtures::post(5, 1, 3, vec![]));

    app.perform(window, ViewAction::ToggleLike);
    let view = detail(&app, "/post/5");
    assert!(view.liked);
    assert_eq!(view.like_count, 4);

    app.apply_event(AppEvent::LikeFinished {
        window,
        result: Err(ApiError::Api("boom".to_string())),
    });
    let view = detail(&app, "/post/5");
    assert!(!view.liked);
    assert_eq!(view.like_count, 3);
}

#[tokio::test]
async fn test_confirmed_delete_removes_post_from_feed() {
    let mut app = logged_in_app(1);
    let feed = app.open_path("/posts").unwrap();
    app.apply_event(AppEvent::FeedLoaded {
        window: feed,
        result: Ok(ApiResponse::success("ok", vec![summary(8), summary(9)])),
    });
    let window = load_post(&mut app, fixtures::post(8, 1, 0, vec![]));

    app.perform(window, ViewAction::DeletePost);
    assert!(matches!(detail(&app, "/post/8").state, PostState::Loaded(_)));

    app.apply_event(AppEvent::PostDeleted {
        window,
        post_id: 8,
        result: Ok(ApiResponse::ok("deleted")),
    });

    assert_eq!(detail(&app, "/post/8").state, PostState::Deleted);
    match &app.context.windows.get(feed).unwrap().content {
        WindowContent::Posts(view) => {
            let ids: Vec<i64> = view.posts.iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![9]);
        }
        other => panic!("expected posts, got {:?}", other),
    }
}

#[test]
fn test_login_sets_session_and_closes_form() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigManager::with_dir(dir.path()).unwrap();
    let mut app = App::with_config(DEAD_SERVER, config);
    let window = app.open_path("/authentication").unwrap();

    let user = fixtures::user(11, 0);
    app.apply_event(AppEvent::LoggedIn {
        window,
        result: Ok(ApiResponse::success(
            "Welcome back",
            AuthPayload {
                token: "tok-11".to_string(),
                user: user.clone(),
            },
        )),
        user: Some(Ok(ApiResponse::success("ok", user))),
    });

    assert_eq!(app.context.session.user_id(), Some(11));
    assert_eq!(app.api_client.session_token(), Some("tok-11"));
    assert!(app.context.windows.get(window).is_none());
    assert_eq!(app.context.notifications.latest().unwrap().message, "Welcome back");

    let saved = app
        .config_manager
        .as_ref()
        .unwrap()
        .load_session()
        .unwrap()
        .unwrap();
    assert_eq!(saved.session_token, "tok-11");
    assert_eq!(saved.server_url, DEAD_SERVER);
}

#[test]
fn test_failed_login_keeps_form_open() {
    let mut app = App::new(DEAD_SERVER);
    let window = app.open_path("/authentication").unwrap();

    app.apply_event(AppEvent::LoggedIn {
        window,
        result: Ok(ApiResponse::error("Wrong password")),
        user: None,
    });

    assert!(!app.context.session.is_logged_in());
    assert!(app.context.windows.get(window).is_some());
    let toast = app.context.notifications.latest().unwrap();
    assert_eq!(toast.status, Status::Error);
    assert_eq!(toast.message, "Wrong password");
}

#[tokio::test]
async fn test_logout_clears_session_and_member_windows() {
    let mut app = logged_in_app(0);
    app.api_client.set_session_token(Some("tok".to_string()));
    app.open_path("/settings");
    app.open_path("/post/create");
    app.open_path("/authentication");

    app.handle_key_event(ctrl('l'));

    assert!(!app.context.session.is_logged_in());
    assert_eq!(app.api_client.session_token(), None);
    assert!(app.context.windows.find_by_path("/settings").is_none());
    assert!(app.context.windows.find_by_path("/post/create").is_none());
    assert!(app.context.windows.find_by_path("/authentication").is_some());
    assert_eq!(
        app.context.notifications.latest().unwrap().message,
        LOGGED_OUT_MESSAGE
    );
}

#[test]
fn test_rejected_saved_session_is_forgotten() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigManager::with_dir(dir.path()).unwrap();
    config
        .save_session(&SavedSession {
            session_token: "stale".to_string(),
            server_url: DEAD_SERVER.to_string(),
        })
        .unwrap();
    let mut app = App::with_config(DEAD_SERVER, config);
    app.api_client.set_session_token(Some("stale".to_string()));

    app.apply_event(AppEvent::SessionRestored(Ok(ApiResponse::error(
        "Session expired",
    ))));

    assert_eq!(app.api_client.session_token(), None);
    assert!(app
        .config_manager
        .as_ref()
        .unwrap()
        .load_session()
        .unwrap()
        .is_none());
}

#[test]
fn test_unreachable_server_keeps_restored_token() {
    let mut app = App::new(DEAD_SERVER);
    app.api_client.set_session_token(Some("tok".to_string()));
    app.context.session.user_loading = true;

    app.apply_event(AppEvent::SessionRestored(Err(ApiError::Api(
        "connection refused".to_string(),
    ))));

    assert_eq!(app.api_client.session_token(), Some("tok"));
    assert!(!app.context.session.user_loading);
    assert!(app.context.notifications.is_empty());
}

#[tokio::test]
async fn test_saved_session_for_other_server_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigManager::with_dir(dir.path()).unwrap();
    config
        .save_session(&SavedSession {
            session_token: "elsewhere".to_string(),
            server_url: "https://pinpics.example.com".to_string(),
        })
        .unwrap();
    let mut app = App::with_config(DEAD_SERVER, config);

    app.start();

    assert_eq!(app.api_client.session_token(), None);
    assert!(!app.context.session.user_loading);
    assert_eq!(app.context.windows.focused().unwrap().path, "/posts");
}

#[test]
fn test_question_mark_toggles_help() {
    let mut app = App::new(DEAD_SERVER);

    app.handle_key_event(key_event(KeyCode::Char('?')));
    assert_eq!(app.context.modals.top(), Some(&Modal::Help));

    app.handle_key_event(key_event(KeyCode::Char('?')));
    assert!(!app.context.modals.is_open());
}

#[test]
fn test_question_mark_types_into_auth_form() {
    let mut app = App::new(DEAD_SERVER);
    app.open_path("/authentication");

    app.handle_key_event(key_event(KeyCode::Char('?')));

    assert!(!app.context.modals.is_open());
}

#[test]
fn test_escape_closes_modal_before_anything_else() {
    let mut app = App::new(DEAD_SERVER);
    app.open_path("/authentication");
    app.context.modals.open(Modal::FullScreenImage {
        image_url: "http://127.0.0.1:9/files/a.png".to_string(),
    });

    app.handle_key_event(key_event(KeyCode::Esc));

    assert!(!app.context.modals.is_open());
    assert_eq!(app.context.windows.len(), 1);
    assert!(app.running);
}

#[test]
fn test_bell_then_follow_link_opens_login() {
    let mut app = App::new(DEAD_SERVER);

    app.handle_key_event(key_event(KeyCode::F(4)));
    assert_eq!(
        app.context.notifications.latest().unwrap().link_to.as_deref(),
        Some("/authentication")
    );

    app.handle_key_event(ctrl('g'));
    assert_eq!(
        app.context.windows.focused().unwrap().path,
        "/authentication"
    );
    assert!(app.context.notifications.is_empty());
}

#[test]
fn test_ctrl_w_closes_focused_and_ctrl_q_quits() {
    let mut app = App::new(DEAD_SERVER);
    app.open_path("/authentication");

    app.handle_key_event(ctrl('w'));
    assert!(app.context.windows.is_empty());

    app.handle_key_event(ctrl('q'));
    assert!(!app.running);
}

#[test]
fn test_settings_save_requires_login() {
    let mut app = App::new(DEAD_SERVER);
    let window = app.open_path("/settings").unwrap();

    app.perform(window, ViewAction::SaveSettings);

    let toast = app.context.notifications.latest().unwrap();
    assert_eq!(toast.message, SETTINGS_LOGIN_MESSAGE);
}

#[test]
fn test_saved_settings_update_session_user() {
    let mut app = logged_in_app(0);
    let window = app.open_path("/settings").unwrap();

    let mut user = fixtures::user(7, 0);
    user.settings.bg_color = Some("10,20,30,1".to_string());
    app.apply_event(AppEvent::SettingsSaved {
        window,
        result: Ok(ApiResponse::success("Settings saved", user)),
    });

    let current = app.context.session.user.as_ref().unwrap();
    assert_eq!(current.settings.bg_color.as_deref(), Some("10,20,30,1"));
}

#[tokio::test]
async fn test_created_post_closes_form_and_links_to_post() {
    let mut app = logged_in_app(0);
    let window = app.open_path("/post/create").unwrap();

    let mut post = fixtures::post(77, 1, 0, vec![]);
    post.author = Author::from(&fixtures::user(7, 0));
    app.apply_event(AppEvent::PostCreated {
        window,
        result: Ok(ApiResponse::success("Post created", post)),
    });

    assert!(app.context.windows.get(window).is_none());
    assert_eq!(
        app.context.notifications.latest().unwrap().link_to.as_deref(),
        Some("/post/77")
    );
}
