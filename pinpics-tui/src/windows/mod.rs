//! Floating windows opened by path
mod manager;
mod registry;

pub use manager::{Opened, Window, WindowId, WindowManager};
pub use registry::{
    Geometry, Registry, RegistryEntry, RegistryError, RouteMatch, WindowKind, WILDCARD,
};
