//! Color theme and styling definitions using ratatui colors
//!
//! Two palettes, light and dark, selected by [`ThemeMode`].

use crate::config::ThemeMode;
use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTheme {
    /// Panel background
    pub background: Color,

    /// Normal text color
    pub normal_text: Color,

    /// Dimmed text (placeholders, related-slide hints)
    pub muted_text: Color,

    /// Panel borders
    pub border: Color,

    /// Panel titles and headings
    pub accent: Color,

    /// Inline code in answers
    pub code: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Error/warning text
    pub error_text: Color,

    /// Progress gauge fill
    pub gauge: Color,

    /// Canvas letterbox around the slide
    pub canvas_bg: Color,
}

impl ColorTheme {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(24, 26, 31),
            normal_text: Color::Rgb(220, 223, 228),
            muted_text: Color::Rgb(120, 126, 138),
            border: Color::Rgb(62, 68, 81),
            accent: Color::Rgb(97, 175, 239),
            code: Style::default()
                .fg(Color::Rgb(229, 192, 123))
                .bg(Color::Rgb(40, 44, 52)),
            status_bg: Color::Rgb(40, 44, 52),
            status_fg: Color::Rgb(220, 223, 228),
            error_text: Color::Rgb(224, 108, 117),
            gauge: Color::Rgb(152, 195, 121),
            canvas_bg: Color::Rgb(16, 17, 20),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(250, 250, 250),
            normal_text: Color::Rgb(56, 58, 66),
            muted_text: Color::Rgb(140, 142, 150),
            border: Color::Rgb(200, 202, 208),
            accent: Color::Rgb(64, 120, 242),
            code: Style::default()
                .fg(Color::Rgb(152, 104, 1))
                .bg(Color::Rgb(234, 234, 235)),
            status_bg: Color::Rgb(229, 229, 230),
            status_fg: Color::Rgb(56, 58, 66),
            error_text: Color::Rgb(202, 18, 67),
            gauge: Color::Rgb(80, 161, 79),
            canvas_bg: Color::Rgb(236, 236, 238),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.normal_text).bg(self.background)
    }

    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_dark() {
        assert_eq!(ColorTheme::default(), ColorTheme::dark());
    }

    #[test]
    fn test_modes_select_palettes() {
        assert_eq!(ColorTheme::for_mode(ThemeMode::Light), ColorTheme::light());
        assert_eq!(ColorTheme::for_mode(ThemeMode::Dark), ColorTheme::dark());
        assert_ne!(ColorTheme::light().background, ColorTheme::dark().background);
    }

    #[test]
    fn test_style_helpers() {
        let theme = ColorTheme::light();
        assert_eq!(theme.status().bg, Some(theme.status_bg));
        assert_eq!(theme.text().fg, Some(theme.normal_text));
        assert!(theme.heading().add_modifier.contains(Modifier::BOLD));
    }
}
