use ratatui::style::Color;

use crate::context::Session;
use crate::views::settings::parse_rgba;

pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub background: Color,
    pub window_bg: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

impl ThemeColors {
    fn base() -> Self {
        Self {
            primary: Color::Rgb(100, 200, 255),   // Light blue
            secondary: Color::Rgb(150, 150, 255), // Purple-blue
            accent: Color::Rgb(255, 100, 200),    // Pink
            text: Color::Rgb(220, 220, 220),
            text_dim: Color::Rgb(120, 120, 120),
            background: Color::Rgb(20, 20, 25),
            window_bg: Color::Rgb(28, 28, 34),
            border: Color::Rgb(70, 70, 85),
            success: Color::Rgb(100, 255, 150),
            warning: Color::Rgb(255, 200, 100),
            error: Color::Rgb(255, 100, 100),
            highlight_bg: Color::Rgb(45, 45, 60),
        }
    }
}

/// Palette for the current session
///
/// The desktop background follows the user's `bg_color` setting, blended
/// over the default background by its alpha.
pub fn get_theme_colors(session: &Session) -> ThemeColors {
    let mut theme = ThemeColors::base();
    let custom = session
        .user
        .as_ref()
        .and_then(|user| user.settings.bg_color.as_deref())
        .and_then(parse_rgba);

    if let Some((r, g, b, alpha)) = custom {
        theme.background = blend((r, g, b), (20, 20, 25), alpha);
    }
    theme
}

fn blend(top: (u8, u8, u8), bottom: (u8, u8, u8), alpha: f32) -> Color {
    let mix = |t: u8, b: u8| (f32::from(t) * alpha + f32::from(b) * (1.0 - alpha)).round() as u8;
    Color::Rgb(mix(top.0, bottom.0), mix(top.1, bottom.1), mix(top.2, bottom.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    #[test]
    fn test_default_background_without_setting() {
        let theme = get_theme_colors(&Session::default());
        assert_eq!(theme.background, Color::Rgb(20, 20, 25));
    }

    #[test]
    fn test_user_background_is_blended() {
        let mut user = fixtures::user(1, 0);
        user.settings.bg_color = Some("200,100,0,1".to_string());
        let mut session = Session::default();
        session.set_user(user);
        assert_eq!(get_theme_colors(&session).background, Color::Rgb(200, 100, 0));

        let mut user = fixtures::user(1, 0);
        user.settings.bg_color = Some("not a colour".to_string());
        session.set_user(user);
        assert_eq!(get_theme_colors(&session).background, Color::Rgb(20, 20, 25));
    }
}
