// Library interface for pinpics (shared by the binary and the integration tests)
pub mod api;
pub mod app;
pub mod config;
pub mod context;

#[macro_use]
pub mod logging;

pub mod server_config;
pub mod terminal;
pub mod text_wrapper;
pub mod ui;
pub mod views;
pub mod windows;
