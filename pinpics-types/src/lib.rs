pub mod enums;
pub mod models;
pub mod response;

pub use enums::*;
pub use models::*;
pub use response::*;
