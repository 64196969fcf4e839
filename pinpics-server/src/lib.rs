// Library exports for pinpics-server so integration tests can drive the router

pub mod api;
pub mod config;
pub mod db;
pub mod password;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
