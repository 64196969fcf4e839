use std::sync::Arc;

use pinpics::api::ApiClient;
use pinpics::app::App;
use pinpics::config::ConfigManager;
use pinpics::views::{PostState, ViewAction, WindowContent};
use pinpics_server::db::repositories::UserRepository;
use pinpics_server::db::Database;
use pinpics_server::routes::router;
use pinpics_server::state::AppState;
use pinpics_server::storage::LocalBucket;
use pinpics_types::Status;
use tempfile::TempDir;

/// A real server on an ephemeral port
struct TestServer {
    url: String,
    db: Database,
    dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let dir = tempfile::tempdir().expect("temp dir");
    let bucket_dir = dir.path().join("pinpictures");
    let db = Database::in_memory().expect("database");
    db.initialize().expect("schema");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));

    let bucket = LocalBucket::new(&bucket_dir, &url).expect("bucket");
    let state = AppState::new(db.clone(), Arc::new(bucket), 4, false);
    let app = router(state, &bucket_dir);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer { url, db, dir }
}

#[tokio::test]
async fn test_client_post_lifecycle() {
    let server = spawn_server().await;
    let mut client = ApiClient::new(&server.url);

    let registered = client
        .registration(
            "mira".to_string(),
            "mira@example.com".to_string(),
            "secret1".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(registered.status, Status::Success);
    let user_id = registered.data.unwrap().user.id;
    assert!(client.session_token().is_some());

    let image = server.dir.path().join("sunset.png");
    std::fs::write(&image, b"not really a png").unwrap();
    let created = client
        .create_post(
            "Sunset".to_string(),
            "Over the harbour".to_string(),
            vec![image],
        )
        .await
        .unwrap();
    let post = created.data.expect("created post");
    assert_eq!(post.images.len(), 1);

    let feed = client.fetch_posts().await.unwrap().data.unwrap();
    assert_eq!(feed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![post.id]);

    let like = client.like_post(post.id).await.unwrap().data.unwrap();
    assert!(like.liked);
    assert_eq!(like.like_count, 1);

    let comment = client
        .upload_comment(post.id, "lovely".to_string())
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(comment.comment, "lovely");

    let full = client.fetch_post(post.id).await.unwrap().data.unwrap();
    assert_eq!(full.comments.len(), 1);
    assert!(full.is_liked_by(user_id));

    let denied = client.delete_post(post.id).await.unwrap();
    assert_eq!(denied.status, Status::Error);

    UserRepository::new(server.db.pool.clone())
        .set_banana_level(user_id, 1)
        .unwrap();
    let deleted = client.delete_post(post.id).await.unwrap();
    assert_eq!(deleted.status, Status::Success);

    let logout = client.logout().await.unwrap();
    assert_eq!(logout.status, Status::Success);
    assert!(client.session_token().is_none());
}

#[tokio::test]
async fn test_wrong_password_is_an_error_envelope() {
    let server = spawn_server().await;
    let mut client = ApiClient::new(&server.url);
    client
        .registration(
            "mira".to_string(),
            "mira@example.com".to_string(),
            "secret1".to_string(),
        )
        .await
        .unwrap();
    client.set_session_token(None);

    let reply = client
        .login("mira".to_string(), "wrong".to_string())
        .await
        .unwrap();
    assert_eq!(reply.status, Status::Error);
    assert!(client.session_token().is_none());
}

/// Drive the app the way the UI loop does until `done` holds
async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..50 {
        if done(app) {
            return;
        }
        match tokio::time::timeout(std::time::Duration::from_secs(2), app.next_event()).await {
            Ok(Some(event)) => app.apply_event(event),
            _ => break,
        }
    }
    assert!(done(app), "condition not reached");
}

#[tokio::test]
async fn test_app_session_survives_restart() {
    let server = spawn_server().await;
    let config_dir = tempfile::tempdir().unwrap();

    // Seed an account
    let mut seed = ApiClient::new(&server.url);
    seed.registration(
        "mira".to_string(),
        "mira@example.com".to_string(),
        "secret1".to_string(),
    )
    .await
    .unwrap();
    seed.set_session_token(None);

    let mut app = App::with_config(
        server.url.clone(),
        ConfigManager::with_dir(config_dir.path()).unwrap(),
    );
    app.start();
    let auth = app.open_path("/authentication").unwrap();
    if let Some(WindowContent::Authentication(form)) =
        app.context.windows.get_mut(auth).map(|w| &mut w.content)
    {
        form.toggle_registration();
        set_text(&mut form.username, "mira");
        set_text(&mut form.password, "secret1");
    }
    app.perform(auth, ViewAction::SubmitAuth);
    pump_until(&mut app, |app| app.context.session.is_logged_in()).await;
    assert!(app.context.windows.get(auth).is_none());

    // A fresh app on the same config directory picks the session up again
    let mut restarted = App::with_config(
        server.url.clone(),
        ConfigManager::with_dir(config_dir.path()).unwrap(),
    );
    restarted.start();
    pump_until(&mut restarted, |app| app.context.session.is_logged_in()).await;
    assert_eq!(
        restarted.context.session.user.as_ref().map(|u| u.name.as_str()),
        Some("mira")
    );
}

#[tokio::test]
async fn test_app_reports_missing_post() {
    let server = spawn_server().await;
    let mut app = App::new(server.url.clone());
    let window = app.open_path("/post/404").unwrap();

    pump_until(&mut app, |app| {
        matches!(
            app.context.windows.get(window).map(|w| &w.content),
            Some(WindowContent::PostDetail(view)) if view.state != PostState::Loading
        )
    })
    .await;

    match &app.context.windows.get(window).unwrap().content {
        WindowContent::PostDetail(view) => assert_eq!(view.state, PostState::NotFound),
        other => panic!("expected post detail, got {:?}", other),
    }
    assert!(app.context.notifications.is_empty());
}

fn set_text(textarea: &mut tui_textarea::TextArea<'static>, text: &str) {
    textarea.select_all();
    textarea.cut();
    textarea.insert_str(text);
}
