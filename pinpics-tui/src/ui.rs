// UI module - split into cohesive submodules for maintainability
pub mod theme;
mod formatting;
mod overlays;
mod windows;

// Re-export main render function
pub use self::render_main::render;

// Main render logic
mod render_main {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
        Frame,
    };

    use super::overlays::{render_footer, render_modal, render_notifications};
    use super::theme::get_theme_colors;
    use super::windows::render_window;
    use crate::app::App;

    /// Render the UI
    pub fn render(app: &mut App, frame: &mut Frame) {
        let area = frame.area();

        let theme = get_theme_colors(&app.context.session);

        frame.render_widget(Clear, area);

        let background = Block::default().style(Style::default().bg(theme.background));
        frame.render_widget(background, area);

        const MIN_WIDTH: u16 = 60;
        const MIN_HEIGHT: u16 = 20;

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let warning = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal Too Small",
                    Style::default()
                        .fg(theme.error)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                    Style::default().fg(theme.text),
                )),
                Line::from(Span::styled(
                    format!("Current size: {}x{}", area.width, area.height),
                    Style::default().fg(theme.warning),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Please resize your terminal window",
                    Style::default().fg(theme.text_dim),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.error)),
            );

            frame.render_widget(warning, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let desktop = chunks[0];

        // Back to front; the last window is focused
        let context = &mut app.context;
        let focused_id = context.windows.focused().map(|w| w.id);
        let session = &context.session;
        for window in context.windows.iter_mut() {
            let focused = Some(window.id) == focused_id;
            render_window(frame, window, focused, session, &theme, desktop);
        }
        log_rendering!(app.log_config, "Rendered {} window(s)", app.context.windows.len());

        render_footer(frame, &app.context.session, &theme, chunks[1]);
        render_notifications(frame, &app.context.notifications, &theme, desktop);
        render_modal(frame, &app.context, &theme, desktop);
    }
}
