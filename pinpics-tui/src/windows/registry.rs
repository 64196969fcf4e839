use std::collections::HashSet;
use std::sync::OnceLock;

use thiserror::Error;

/// Fallback entry used when nothing else matches
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Authentication,
    Posts,
    CreatePost,
    Settings,
    PostDetail,
    NotFound,
}

/// Default window geometry in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub min_width: u16,
    pub min_height: u16,
    pub initial_x: u16,
    pub initial_y: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Exact path, a pattern with `:name` segments, or `*`
    pub key: &'static str,
    pub title: &'static str,
    pub kind: WindowKind,
    pub geometry: Geometry,
}

/// Result of resolving a path against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RegistryEntry,
    /// Values captured by `:name` segments, in order
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate registry key: {0}")]
    DuplicateKey(String),
}

/// Static table mapping paths to window kinds and geometry
#[derive(Debug)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key) {
                return Err(RegistryError::DuplicateKey(entry.key.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The table every window manager opens from
    pub fn standard() -> Result<&'static Registry, RegistryError> {
        static STANDARD: OnceLock<Result<Registry, RegistryError>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Registry::new(standard_entries()))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Exact match first, then `:param` patterns, then the wildcard
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(path);

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.key != WILDCARD && !e.key.contains(':') && e.key == path)
        {
            return Some(RouteMatch {
                entry,
                params: Vec::new(),
            });
        }

        for entry in self.entries.iter().filter(|e| e.key.contains(':')) {
            if let Some(params) = match_pattern(entry.key, path) {
                return Some(RouteMatch { entry, params });
            }
        }

        self.entries
            .iter()
            .find(|e| e.key == WILDCARD)
            .map(|entry| RouteMatch {
                entry,
                params: Vec::new(),
            })
    }
}

/// Trimmed, without a trailing slash except for the root
pub(super) fn normalize(path: &str) -> &str {
    let trimmed = path.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    }
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Vec<(&'static str, String)>> {
    let pattern_segments: Vec<&'static str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Vec::new();
    for (expected, actual) in pattern_segments.into_iter().zip(path_segments) {
        if let Some(name) = expected.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            params.push((name, actual.to_string()));
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

fn standard_entries() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry {
            key: "/authentication",
            title: "Authentication",
            kind: WindowKind::Authentication,
            geometry: Geometry {
                width: 56,
                height: 18,
                min_width: 44,
                min_height: 14,
                initial_x: 4,
                initial_y: 2,
            },
        },
        RegistryEntry {
            key: "/posts",
            title: "Posts",
            kind: WindowKind::Posts,
            geometry: Geometry {
                width: 60,
                height: 24,
                min_width: 40,
                min_height: 12,
                initial_x: 2,
                initial_y: 1,
            },
        },
        RegistryEntry {
            key: "/post/create",
            title: "New post",
            kind: WindowKind::CreatePost,
            geometry: Geometry {
                width: 70,
                height: 20,
                min_width: 56,
                min_height: 16,
                initial_x: 8,
                initial_y: 3,
            },
        },
        RegistryEntry {
            key: "/settings",
            title: "Settings",
            kind: WindowKind::Settings,
            geometry: Geometry {
                width: 56,
                height: 12,
                min_width: 44,
                min_height: 10,
                initial_x: 10,
                initial_y: 4,
            },
        },
        RegistryEntry {
            key: "/post/:id",
            title: "Post",
            kind: WindowKind::PostDetail,
            geometry: Geometry {
                width: 84,
                height: 28,
                min_width: 60,
                min_height: 18,
                initial_x: 12,
                initial_y: 2,
            },
        },
        RegistryEntry {
            key: WILDCARD,
            title: "Not found",
            kind: WindowKind::NotFound,
            geometry: Geometry {
                width: 40,
                height: 8,
                min_width: 30,
                min_height: 6,
                initial_x: 6,
                initial_y: 4,
            },
        },
    ]
}
