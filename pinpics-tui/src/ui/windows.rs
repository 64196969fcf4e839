use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

use super::formatting::{
    clip_to, format_comment, format_text_with_width, format_timestamp, BORDER_PADDING,
};
use super::theme::ThemeColors;
use crate::context::Session;
use crate::views::auth_form::AuthField;
use crate::views::create_post::CreateField;
use crate::views::{
    AuthForm, AuthMode, CreatePostForm, DetailPane, FeedState, FeedView, PostDetailView,
    PostState, SettingsForm, WindowContent,
};
use crate::windows::Window;

/// Draw one floating window, clipped to `area`
pub fn render_window(
    frame: &mut Frame,
    window: &mut Window,
    focused: bool,
    session: &Session,
    theme: &ThemeColors,
    area: Rect,
) {
    let Some(rect) = clip_to(area, window.x, window.y, window.width, window.height) else {
        return;
    };

    frame.render_widget(Clear, rect);
    let border_style = if focused {
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", window.title))
        .style(Style::default().bg(theme.window_bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    match &mut window.content {
        WindowContent::Authentication(form) => render_auth(frame, form, theme, inner),
        WindowContent::Posts(feed) => render_feed(frame, feed, theme, inner),
        WindowContent::CreatePost(form) => render_create_post(frame, form, theme, inner),
        WindowContent::Settings(form) => render_settings(frame, form, session, theme, inner),
        WindowContent::PostDetail(view) => render_post_detail(frame, view, session, theme, inner),
        WindowContent::NotFound { path } => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Nothing here",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("No window is registered for {}", path),
                    Style::default().fg(theme.text_dim),
                )),
            ];
            frame.render_widget(
                Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
                inner,
            );
        }
    }
}

fn render_input(
    frame: &mut Frame,
    label: &str,
    input: &TextArea<'static>,
    focused: bool,
    theme: &ThemeColors,
    area: Rect,
) {
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(label.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(input, inner);
}

fn hint_line(text: &str, theme: &ThemeColors) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme.text_dim),
    )))
}

fn render_auth(frame: &mut Frame, form: &AuthForm, theme: &ThemeColors, area: Rect) {
    let fields = form.fields();
    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let heading = match form.mode {
        AuthMode::Registration => "Create an account",
        AuthMode::Login => "Log in",
        AuthMode::ForgotPassword => "Reset your password",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            heading,
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    for (i, field) in fields.iter().enumerate() {
        let label = match field {
            AuthField::Username => "Username",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
        };
        render_input(
            frame,
            label,
            form.input(*field),
            form.focus == *field,
            theme,
            chunks[i + 1],
        );
    }

    let hint = if form.is_submitting() {
        "Sending..."
    } else {
        "Enter: submit  Tab: next field  Ctrl+R: register/login  Ctrl+F: forgot password"
    };
    frame.render_widget(
        hint_line(hint, theme).wrap(Wrap { trim: true }),
        chunks[fields.len() + 1],
    );
}

fn render_feed(frame: &mut Frame, feed: &mut FeedView, theme: &ThemeColors, area: Rect) {
    match &feed.state {
        FeedState::Loading if feed.posts.is_empty() => {
            frame.render_widget(hint_line("Loading posts...", theme), area);
            return;
        }
        FeedState::Error(message) if feed.posts.is_empty() => {
            let lines = vec![
                Line::from(Span::styled(message.clone(), Style::default().fg(theme.error))),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(theme.text_dim),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }
        _ => {}
    }

    if feed.posts.is_empty() {
        frame.render_widget(hint_line("No posts yet.", theme), area);
        return;
    }

    let width = area.width.saturating_sub(BORDER_PADDING) as usize;
    let items: Vec<ListItem> = feed
        .posts
        .iter()
        .map(|post| {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    post.name.clone(),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  by {}", post.author.name),
                    Style::default().fg(theme.secondary),
                ),
            ])];
            if !post.description.is_empty() {
                lines.extend(format_text_with_width(&post.description, theme, width).into_iter().take(2));
            }
            lines.push(Line::from(Span::styled(
                format!(
                    "  {}  \u{2665} {}  \u{1F4AC} {}",
                    format_timestamp(&post.created_at),
                    post.like_count,
                    post.comment_count
                ),
                Style::default().fg(theme.text_dim),
            )));
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).highlight_style(Style::default().bg(theme.highlight_bg));
    frame.render_stateful_widget(list, area, &mut feed.list_state);
}

fn render_create_post(frame: &mut Frame, form: &CreatePostForm, theme: &ThemeColors, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    render_input(frame, "Name", &form.name, form.focus == CreateField::Name, theme, chunks[0]);
    render_input(
        frame,
        "Description",
        &form.description,
        form.focus == CreateField::Description,
        theme,
        chunks[1],
    );
    render_input(
        frame,
        "Images",
        &form.images,
        form.focus == CreateField::Images,
        theme,
        chunks[2],
    );

    let hint = if form.is_submitting() {
        "Uploading..."
    } else {
        "Enter: post  Tab: next field"
    };
    frame.render_widget(hint_line(hint, theme), chunks[3]);
}

fn render_settings(
    frame: &mut Frame,
    form: &SettingsForm,
    session: &Session,
    theme: &ThemeColors,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let who = match &session.user {
        Some(user) => format!("Signed in as {} <{}>", user.name, user.email),
        None => "Not signed in".to_string(),
    };
    frame.render_widget(hint_line(&who, theme), chunks[0]);
    render_input(frame, "Background colour", &form.bg_color, true, theme, chunks[1]);
    frame.render_widget(hint_line("Enter: save", theme), chunks[2]);
}

fn render_post_detail(
    frame: &mut Frame,
    view: &PostDetailView,
    session: &Session,
    theme: &ThemeColors,
    area: Rect,
) {
    let post = match &view.state {
        PostState::Loading => {
            frame.render_widget(hint_line("Loading post...", theme), area);
            return;
        }
        PostState::NotFound => {
            frame.render_widget(
                Paragraph::new(Span::styled("Post not found.", Style::default().fg(theme.error))),
                area,
            );
            return;
        }
        PostState::Error(message) => {
            let lines = vec![
                Line::from(Span::styled(message.clone(), Style::default().fg(theme.error))),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(theme.text_dim),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }
        PostState::Deleted => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "This post was deleted.",
                    Style::default().fg(theme.warning),
                )),
                area,
            );
            return;
        }
        PostState::Loaded(post) => post,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(columns[1]);

    let pane_style = |pane: DetailPane| {
        if view.pane == pane {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.border)
        }
    };

    // Image pane
    let mut image_lines = vec![Line::from("")];
    match view.current_image_url() {
        Some(url) => {
            image_lines.push(Line::from(Span::styled(
                format!("Image {}/{}", view.image_index + 1, view.image_count()),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )));
            image_lines.push(Line::from(Span::styled(
                url.to_string(),
                Style::default().fg(theme.text_dim),
            )));
            image_lines.push(Line::from(""));
            image_lines.push(Line::from(Span::styled(
                "h/l: browse  z: zoom",
                Style::default().fg(theme.text_dim),
            )));
        }
        None => image_lines.push(Line::from(Span::styled(
            "No images",
            Style::default().fg(theme.text_dim),
        ))),
    }
    frame.render_widget(
        Paragraph::new(image_lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(pane_style(DetailPane::Image))
                    .title(" Images "),
            ),
        columns[0],
    );

    // Details and comments
    let width = right[0].width.saturating_sub(BORDER_PADDING) as usize;
    let heart = if view.liked { "\u{2665}" } else { "\u{2661}" };
    let mut lines = vec![
        Line::from(Span::styled(
            post.name.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(post.author.name.clone(), Style::default().fg(theme.secondary)),
            Span::styled(
                format!("  {}", format_timestamp(&post.created_at)),
                Style::default().fg(theme.text_dim),
            ),
        ]),
    ];
    lines.extend(format_text_with_width(&post.description, theme, width));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} {}", heart, view.like_count),
            Style::default().fg(if view.liked { theme.accent } else { theme.text }),
        ),
        Span::styled(
            if view.is_like_in_flight() { "  ..." } else { "" },
            Style::default().fg(theme.text_dim),
        ),
    ]));
    if view.can_delete(session) {
        let hint = if view.delete_armed {
            "Press d again to delete this post"
        } else {
            "d d: delete post"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.warning))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Comments ({})", view.comments.len()),
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )));
    for comment in view.comments.iter().skip(view.comment_scroll) {
        lines.extend(format_comment(comment, theme, width));
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_style(DetailPane::Details))
                .title(" Details "),
        ),
        right[0],
    );

    render_input(
        frame,
        "Comment",
        &view.comment_input,
        view.pane == DetailPane::Comments,
        theme,
        right[1],
    );
}
