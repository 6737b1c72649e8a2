//! TUI theming support.
//!
//! This module provides the `Theme` struct which defines the color palette
//! for the review screen. It supports light and dark themes, as well as
//! automatic detection based on the terminal environment.

use ratatui::style::Color;

use crate::cli::ThemeArg;

/// A collection of colors used for TUI components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Header text and borders
    pub primary: Color,
    /// Key hints and the source panel
    pub secondary: Color,
    /// Notices and the removal counter
    pub danger: Color,
    /// The destination panel and playback gauge
    pub success: Color,
    /// Labels and secondary text
    pub dim: Color,
    /// Main text
    pub normal: Color,
}

impl Theme {
    /// High-contrast dark theme (default).
    #[must_use]
    pub fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::Yellow,
            danger: Color::Red,
            success: Color::Green,
            dim: Color::DarkGray,
            normal: Color::White,
        }
    }

    /// High-contrast light theme.
    #[must_use]
    pub fn light() -> Self {
        Self {
            primary: Color::Blue,
            secondary: Color::Magenta,
            danger: Color::Red,
            success: Color::Green,
            dim: Color::Gray,
            normal: Color::Black,
        }
    }

    /// Detect terminal theme or return dark theme as default.
    #[must_use]
    pub fn auto() -> Self {
        if is_light_background(std::env::var("COLORFGBG").ok().as_deref()) {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Resolve the theme selected on the command line or in config.
    #[must_use]
    pub fn from_arg(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Self::dark(),
            ThemeArg::Light => Self::light(),
            ThemeArg::Auto => Self::auto(),
        }
    }

    /// Check if this is a light theme.
    #[must_use]
    pub fn is_light(&self) -> bool {
        self.normal == Color::Black
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Interpret a `COLORFGBG` value (`"fg;bg"`, set by rxvt, xterm, konsole).
///
/// 0 is black, 7 light gray, 8 dark gray, 15 white.
fn is_light_background(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u32>().ok())
        .is_some_and(|bg| bg >= 7 && bg != 8)
}
