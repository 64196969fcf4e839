use pinpics_types::Status;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::formatting::centered_rect;
use super::theme::ThemeColors;
use crate::context::{AppContext, Modal, Notifications, Session};
use crate::views::dock_items;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

/// Bottom dock with one entry per hotkey
pub fn render_footer(frame: &mut Frame, session: &Session, theme: &ThemeColors, area: Rect) {
    let mut spans = Vec::new();
    for item in dock_items(session) {
        let key = match item.hotkey() {
            crossterm::event::KeyCode::F(n) => format!("F{}", n),
            _ => String::new(),
        };
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(theme.background).bg(theme.primary),
        ));
        spans.push(Span::styled(
            format!(" {}  ", item.label()),
            Style::default().fg(theme.text),
        ));
    }

    let status = match &session.user {
        Some(user) => format!("{} ", user.name),
        None if session.user_loading => "Signing in... ".to_string(),
        None => "Guest ".to_string(),
    };
    spans.push(Span::styled(status, Style::default().fg(theme.text_dim)));
    spans.push(Span::styled("  ?: help", Style::default().fg(theme.text_dim)));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.highlight_bg)),
        area,
    );
}

/// Toasts stacked in the top right corner, newest on top
pub fn render_notifications(
    frame: &mut Frame,
    notifications: &Notifications,
    theme: &ThemeColors,
    area: Rect,
) {
    if area.width < TOAST_WIDTH {
        return;
    }

    let x = area.x + area.width - TOAST_WIDTH;
    let mut y = area.y;
    for notification in notifications.iter().rev() {
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let color = match notification.status {
            Status::Success => theme.success,
            Status::Error => theme.error,
            _ => theme.primary,
        };
        let mut lines = vec![Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(theme.text),
        ))];
        if let Some(link) = &notification.link_to {
            lines.push(Line::from(Span::styled(
                format!("Ctrl+G: open {}", link),
                Style::default().fg(theme.text_dim),
            )));
        }

        let rect = Rect::new(x, y, TOAST_WIDTH, TOAST_HEIGHT);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(theme.window_bg)),
            ),
            rect,
        );
        y += TOAST_HEIGHT;
    }
}

pub fn render_modal(frame: &mut Frame, context: &AppContext, theme: &ThemeColors, area: Rect) {
    match context.modals.top() {
        Some(Modal::Help) => render_help_modal(frame, theme, area),
        Some(Modal::FullScreenImage { image_url }) => {
            render_image_modal(frame, image_url, theme, area)
        }
        None => {}
    }
}

fn shortcuts() -> Vec<(&'static str, Vec<(&'static str, &'static str)>)> {
    vec![
        (
            "Windows",
            vec![
                ("F1", "Posts"),
                ("F2", "Log in / Settings"),
                ("F3", "New post"),
                ("F4", "Notifications"),
                ("Ctrl+O", "Focus next window"),
                ("Ctrl+W", "Close window"),
                ("Ctrl+Arrows", "Move window"),
                ("Shift+Arrows", "Resize window"),
                ("Ctrl+G", "Open notification link"),
                ("Ctrl+L", "Log out"),
                ("Ctrl+Q", "Quit"),
            ],
        ),
        (
            "Posts",
            vec![
                ("j/k", "Select post"),
                ("Enter", "Open post"),
                ("r", "Reload"),
            ],
        ),
        (
            "Post",
            vec![
                ("Tab", "Switch pane"),
                ("h/l", "Previous / next image"),
                ("z", "Zoom image"),
                ("Space", "Like / unlike"),
                ("c", "Write a comment"),
                ("d d", "Delete post"),
            ],
        ),
    ]
}

fn render_help_modal(frame: &mut Frame, theme: &ThemeColors, area: Rect) {
    let modal_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal_area);

    let mut lines = vec![Line::from("")];
    for (category, items) in shortcuts() {
        lines.push(Line::from(Span::styled(
            category,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        for (key, description) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<15}", key), Style::default().fg(theme.success)),
                Span::styled(description, Style::default().fg(theme.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
                .title(" Keyboard Shortcuts ")
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.background)),
        ),
        modal_area,
    );
}

fn render_image_modal(frame: &mut Frame, image_url: &str, theme: &ThemeColors, area: Rect) {
    let modal_area = centered_rect(90, 90, area);
    frame.render_widget(Clear, modal_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            image_url.to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "o: open in browser  Esc: close",
            Style::default().fg(theme.text_dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.primary))
                    .title(" Image ")
                    .style(Style::default().bg(theme.background)),
            ),
        modal_area,
    );
}
