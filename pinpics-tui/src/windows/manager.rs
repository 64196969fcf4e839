use super::registry::{normalize, Geometry, Registry, WindowKind};
use crate::views::WindowContent;

pub type WindowId = u64;

/// A floating window hosting one view
#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    pub path: String,
    pub title: String,
    pub kind: WindowKind,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub min_width: u16,
    pub min_height: u16,
    pub content: WindowContent,
}

impl Window {
    fn from_geometry(
        id: WindowId,
        path: String,
        title: String,
        kind: WindowKind,
        geometry: Geometry,
        content: WindowContent,
    ) -> Self {
        Self {
            id,
            path,
            title,
            kind,
            x: geometry.initial_x,
            y: geometry.initial_y,
            width: geometry.width,
            height: geometry.height,
            min_width: geometry.min_width,
            min_height: geometry.min_height,
            content,
        }
    }
}

/// Result of [`WindowManager::open_window_by_path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opened {
    pub id: WindowId,
    /// False when an existing window for the path was focused instead
    pub created: bool,
}

/// Z-ordered window stack; the last window is frontmost and focused
#[derive(Debug, Default)]
pub struct WindowManager {
    windows: Vec<Window>,
    next_id: WindowId,
}

impl WindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window registered for `path`, or focus it if already open
    pub fn open_window_by_path(&mut self, path: &str) -> Option<Opened> {
        let path = normalize(path);
        if let Some(id) = self.find_by_path(path) {
            self.focus(id);
            return Some(Opened { id, created: false });
        }

        let registry = match Registry::standard() {
            Ok(registry) => registry,
            Err(e) => {
                log::error!(target: "windows", "Window registry unusable: {}", e);
                return None;
            }
        };
        let route = registry.resolve(path)?;
        let content = WindowContent::for_route(&route, path);
        let title = match route.param("id") {
            Some(id) => format!("{} #{}", route.entry.title, id),
            None => route.entry.title.to_string(),
        };

        self.next_id += 1;
        let id = self.next_id;
        let window = Window::from_geometry(
            id,
            path.to_string(),
            title,
            route.entry.kind,
            route.entry.geometry,
            content,
        );
        log::debug!(target: "windows", "Opened window {} for {}", id, path);
        self.windows.push(window);
        Some(Opened { id, created: true })
    }

    pub fn remove_window(&mut self, id: WindowId) -> Option<Window> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        log::debug!(target: "windows", "Closed window {}", id);
        Some(self.windows.remove(index))
    }

    pub fn close_focused(&mut self) -> Option<Window> {
        let id = self.focused()?.id;
        self.remove_window(id)
    }

    /// Bring a window to the front
    pub fn focus(&mut self, id: WindowId) -> bool {
        match self.windows.iter().position(|w| w.id == id) {
            Some(index) => {
                let window = self.windows.remove(index);
                self.windows.push(window);
                true
            }
            None => false,
        }
    }

    /// Send the front window to the back, exposing the next one
    pub fn focus_next(&mut self) {
        if self.windows.len() > 1 {
            self.windows.rotate_right(1);
        }
    }

    pub fn focused(&self) -> Option<&Window> {
        self.windows.last()
    }

    pub fn focused_mut(&mut self) -> Option<&mut Window> {
        self.windows.last_mut()
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<WindowId> {
        let path = normalize(path);
        self.windows.iter().find(|w| w.path == path).map(|w| w.id)
    }

    pub fn move_focused(&mut self, dx: i32, dy: i32) {
        if let Some(window) = self.windows.last_mut() {
            window.x = offset(window.x, dx);
            window.y = offset(window.y, dy);
        }
    }

    /// Resize the front window, never below its minimum size
    pub fn resize_focused(&mut self, dw: i32, dh: i32) {
        if let Some(window) = self.windows.last_mut() {
            window.width = offset(window.width, dw).max(window.min_width);
            window.height = offset(window.height, dh).max(window.min_height);
        }
    }

    /// Back to front
    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Window> {
        self.windows.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

fn offset(value: u16, delta: i32) -> u16 {
    (i32::from(value) + delta).clamp(0, i32::from(u16::MAX)) as u16
}
