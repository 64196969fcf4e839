mod client;
mod error;

pub use client::{ApiClient, SESSION_HEADER};
pub use error::{ApiError, ApiResult};
