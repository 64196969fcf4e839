use pinpics_types::Comment;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::theme::ThemeColors;
use crate::text_wrapper::wrap_for_display;

// Total horizontal padding from borders (2 per side)
pub const BORDER_PADDING: u16 = 4;

/// Format timestamp for display
pub fn format_timestamp(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Wrapped, indented text lines
pub fn format_text_with_width(
    content: &str,
    theme: &ThemeColors,
    max_width: usize,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = wrap_for_display(content, max_width.saturating_sub(2))
        .into_iter()
        .map(|line| {
            Line::from(vec![
                Span::raw("  "),
                Span::styled(line, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

/// Author header plus wrapped body for one comment
pub fn format_comment(comment: &Comment, theme: &ThemeColors, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            comment.author.name.clone(),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_timestamp(&comment.created_at)),
            Style::default().fg(theme.text_dim),
        ),
    ])];
    lines.extend(format_text_with_width(&comment.comment, theme, max_width));
    lines
}

/// Rect of `percent_x` by `percent_y` centred in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Clip a window rect to the visible area, `None` if nothing is left
pub fn clip_to(area: Rect, x: u16, y: u16, width: u16, height: u16) -> Option<Rect> {
    let rect = Rect {
        x: area.x.saturating_add(x),
        y: area.y.saturating_add(y),
        width,
        height,
    };
    let visible = rect.intersection(area);
    (visible.width > 2 && visible.height > 2).then_some(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(centered_rect(50, 50, area), Rect::new(25, 12, 50, 25));
    }

    #[test]
    fn test_clip_to_area() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(clip_to(area, 70, 20, 40, 10), Some(Rect::new(70, 20, 10, 4)));
        assert_eq!(clip_to(area, 79, 0, 40, 10), None);
        assert_eq!(clip_to(area, 200, 0, 40, 10), None);
    }
}
