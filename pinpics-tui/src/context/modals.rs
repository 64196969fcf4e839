/// Overlays drawn above every window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Zoomed image; `o` hands the URL to the system browser
    FullScreenImage { image_url: String },
    Help,
}

/// Stack of open modals; only the top one receives keys
#[derive(Debug, Default)]
pub struct Modals {
    stack: Vec<Modal>,
}

impl Modals {
    pub fn open(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn close_top(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
