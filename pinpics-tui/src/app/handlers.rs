use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use crate::context::Modal;
use crate::{log_key_event, log_window};
use crate::views::{footer, DetailPane, DockItem, ViewAction, WindowContent};

const MOVE_STEP: i32 = 2;
const RESIZE_STEP: i32 = 2;

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        log_key_event!(self.log_config, "{:?} {:?}", key.code, key.modifiers);

        // Priority 1: modals swallow every key
        if self.context.modals.is_open() {
            self.handle_modal_keys(key);
            return;
        }

        // Priority 2: global shortcuts
        if self.handle_global_keys(key) {
            return;
        }

        // Priority 3: dock hotkeys
        if let KeyCode::F(_) = key.code {
            if let Some(item) = footer::item_for_key(&self.context.session, key.code) {
                self.activate_dock_item(item);
            }
            return;
        }

        // Priority 4: focused window
        let Some(window) = self.context.windows.focused_mut() else {
            if key.code == KeyCode::Char('?') {
                self.context.modals.open(Modal::Help);
            }
            return;
        };
        let window_id = window.id;

        if key.code == KeyCode::Char('?') && !captures_text(&window.content) {
            self.context.modals.open(Modal::Help);
            return;
        }

        let action = match &mut window.content {
            WindowContent::Authentication(form) => form.handle_key(key),
            WindowContent::Posts(feed) => feed.handle_key(key),
            WindowContent::CreatePost(form) => form.handle_key(key),
            WindowContent::Settings(form) => form.handle_key(key),
            WindowContent::PostDetail(view) => view.handle_key(key),
            WindowContent::NotFound { .. } => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.close_window(window_id);
                    return;
                }
                _ => ViewAction::None,
            },
        };

        if action != ViewAction::None {
            log_key_event!(self.log_config, "Window {} -> {:?}", window_id, action);
        }
        self.perform(window_id, action);
    }

    fn handle_modal_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.context.modals.close_top();
            }
            KeyCode::Char('?') if self.context.modals.top() == Some(&Modal::Help) => {
                self.context.modals.close_top();
            }
            KeyCode::Char('o') => {
                if let Some(Modal::FullScreenImage { image_url }) = self.context.modals.top() {
                    if let Err(e) = webbrowser::open(image_url) {
                        log::warn!("Could not open {} in browser: {}", image_url, e);
                        self.context
                            .notifications
                            .error("Could not open the image in a browser.", None);
                    }
                }
            }
            _ => {}
        }
    }

    /// Returns true when the key was consumed
    fn handle_global_keys(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.running = false,
                KeyCode::Char('w') => {
                    if let Some(window) = self.context.windows.close_focused() {
                        log_window!(self.log_config, "Closed window {}", window.id);
                    }
                }
                KeyCode::Char('o') => self.context.windows.focus_next(),
                KeyCode::Char('l') => self.logout(),
                KeyCode::Char('g') => self.follow_notification_link(),
                KeyCode::Left => self.context.windows.move_focused(-MOVE_STEP, 0),
                KeyCode::Right => self.context.windows.move_focused(MOVE_STEP, 0),
                KeyCode::Up => self.context.windows.move_focused(0, -1),
                KeyCode::Down => self.context.windows.move_focused(0, 1),
                _ => return false,
            }
            return true;
        }

        if shift {
            match key.code {
                KeyCode::Left => self.context.windows.resize_focused(-RESIZE_STEP, 0),
                KeyCode::Right => self.context.windows.resize_focused(RESIZE_STEP, 0),
                KeyCode::Up => self.context.windows.resize_focused(0, -1),
                KeyCode::Down => self.context.windows.resize_focused(0, 1),
                _ => return false,
            }
            return true;
        }

        false
    }

    pub fn activate_dock_item(&mut self, item: DockItem) {
        match item.path() {
            Some(path) => {
                self.open_path(path);
            }
            None => footer::ring_bell(&self.context.session, &mut self.context.notifications),
        }
    }
}

/// Whether printable keys go to a text input in this view
fn captures_text(content: &WindowContent) -> bool {
    match content {
        WindowContent::Authentication(_)
        | WindowContent::CreatePost(_)
        | WindowContent::Settings(_) => true,
        WindowContent::PostDetail(view) => view.pane == DetailPane::Comments,
        WindowContent::Posts(_) | WindowContent::NotFound { .. } => false,
    }
}
