use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use pinpics::app::App;
use pinpics::config::ConfigManager;
use pinpics::logging::{self, LogConfig};
use pinpics::server_config::{ServerConfigManager, SERVER_URL_ENV};
use pinpics::{terminal, ui};

/// Pinpics - a keyboard-driven terminal client for the Pinpics image board
#[derive(Parser)]
#[command(name = "pinpics")]
#[command(about = "Browse, post and discuss images from the terminal")]
#[command(version)]
struct Cli {
    /// Server URL to connect to
    #[arg(long, short, env = SERVER_URL_ENV)]
    server: Option<String>,

    /// Remember the server URL for later runs
    #[arg(long)]
    save_server: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let server_config_manager = ServerConfigManager::new(ConfigManager::new()?);
    let server_url = server_config_manager.determine_server_url(cli.server)?;
    if cli.save_server {
        server_config_manager.save_server_url(server_url.clone())?;
    }
    log::info!(
        "Connecting to {} ({})",
        server_url,
        ServerConfigManager::server_description(&server_url)
    );

    let mut app = App::with_config(server_url, server_config_manager.config().clone());
    app.log_config = log_config;
    app.start();

    let mut tui = terminal::init()?;
    let result = run(&mut tui, &mut app);
    terminal::restore()?;
    result
}

fn run(tui: &mut terminal::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();
        tui.draw(|frame| ui::render(app, frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key);
                }
            }
        }
    }
    Ok(())
}
