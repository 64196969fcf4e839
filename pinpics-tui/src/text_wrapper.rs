/// Text wrapping utilities for terminal UI
use tui_textarea::{CursorMove, TextArea};

/// Configuration for text wrapping behavior
#[derive(Debug, Clone, Copy)]
pub struct WrapConfig {
    /// Maximum width before wrapping (in characters)
    pub wrap_width: usize,
}

impl WrapConfig {
    /// Description field of the new post form
    pub const DESCRIPTION: Self = Self { wrap_width: 60 };
}

/// Wrap text in a TextArea if the current line exceeds the configured width
///
/// The cursor line is split at the last space before `wrap_width` and the
/// cursor stays next to the character it was on.
pub fn wrap_textarea_if_needed(textarea: &mut TextArea<'static>, config: WrapConfig) {
    let (row, col) = textarea.cursor();
    let lines: Vec<String> = textarea.lines().to_vec();
    let Some(current_line) = lines.get(row) else {
        return;
    };

    let chars: Vec<char> = current_line.chars().collect();
    if chars.len() <= config.wrap_width {
        return;
    }

    let wrap_point = chars[..config.wrap_width]
        .iter()
        .rposition(|c| *c == ' ')
        .unwrap_or(config.wrap_width);

    let first_part: String = chars[..wrap_point].iter().collect();
    let second_part: String = chars[wrap_point..].iter().collect();
    let first_part = first_part.trim_end().to_string();
    let second_part = second_part.trim_start().to_string();
    let skipped = chars.len() - first_part.chars().count() - second_part.chars().count();

    let mut new_lines = Vec::with_capacity(lines.len() + 1);
    for (i, line) in lines.iter().enumerate() {
        if i == row {
            new_lines.push(first_part.clone());
            new_lines.push(second_part.clone());
        } else {
            new_lines.push(line.clone());
        }
    }

    // Edit in place so placeholder, mask and styles survive
    textarea.select_all();
    textarea.cut();
    textarea.insert_str(new_lines.join("\n"));

    let first_len = first_part.chars().count();
    let (new_row, new_col) = if col <= first_len {
        (row, col)
    } else {
        (
            row + 1,
            col.saturating_sub(first_len + skipped)
                .min(second_part.chars().count()),
        )
    };
    textarea.move_cursor(CursorMove::Jump(new_row as u16, new_col as u16));
}

/// Wrap plain text for display; empty input yields one empty line
pub fn wrap_for_display(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            out.push(String::new());
            continue;
        }
        out.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(|line| line.into_owned()),
        );
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}
