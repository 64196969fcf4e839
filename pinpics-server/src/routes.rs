use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// Upper bound for a multipart post upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the application router
///
/// `files_dir` is the local bucket directory served under `/files`.
pub fn router(state: AppState, files_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // User routes
        .route("/api/user", get(api::user::get_user))
        .route("/api/user/registration", post(api::auth::registration))
        .route("/api/user/login", post(api::auth::login))
        .route("/api/user/logout", post(api::auth::logout))
        .route("/api/user/forgot-password", post(api::auth::forgot_password))
        .route("/api/user/reset-password", post(api::auth::reset_password))
        .route("/api/user/settings", put(api::user::update_settings))
        // Post routes
        .route(
            "/api/post",
            get(api::posts::list_posts)
                .post(api::posts::create_post)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/post/:id",
            get(api::posts::get_post).delete(api::posts::delete_post),
        )
        .route("/api/post/:id/like", post(api::posts::toggle_like))
        .route("/api/post/:id/comment", post(api::posts::add_comment))
        .nest_service("/files", ServeDir::new(files_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
