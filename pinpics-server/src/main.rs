use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use pinpics_server::{config, db, routes, state::AppState, storage::LocalBucket};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinpics_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new().context("Failed to load settings")?;

    let db = db::Database::new(&settings.database.path).context("Failed to create database")?;
    db.initialize().context("Failed to initialize database schema")?;

    if settings.database.seed_demo_data {
        db.seed_demo_data(settings.auth.bcrypt_cost)
            .context("Failed to seed demo data")?;
        tracing::info!("Demo data ready");
    }

    tracing::info!("Database initialized successfully");

    let bucket_dir = settings.storage.bucket_dir();
    let bucket = LocalBucket::new(&bucket_dir, &settings.server.public_url)
        .context("Failed to open storage bucket")?;
    tracing::info!("Storing images in {}", bucket_dir.display());

    let state = AppState::new(
        db,
        Arc::new(bucket),
        settings.auth.bcrypt_cost,
        settings.server.production,
    );

    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) if count > 0 => tracing::info!("Cleaned up {} expired sessions on startup", count),
        Ok(_) => tracing::info!("No expired sessions to clean up"),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {}", e),
    }

    // Hourly session cleanup
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            tracing::debug!("Running periodic session cleanup...");
            match cleanup_state.session_manager.cleanup_expired_sessions() {
                Ok(count) if count > 0 => {
                    tracing::info!("Periodic cleanup: removed {} expired sessions", count)
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Periodic session cleanup failed: {}", e),
            }
        }
    });

    let app = routes::router(state, &bucket_dir);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
