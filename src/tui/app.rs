//! TUI application state.
//!
//! # Overview
//!
//! `App` holds everything the renderer needs for the review screen:
//! the pair on display with its probed media details, the position of
//! that pair in the session, the playback position of a video pair, and
//! the most recent notice.
//!
//! `App` is owned by the UI thread. The input thread never touches it;
//! decisions travel through the decision slot instead.
//!
//! # Example
//!
//! ```
//! use dupereview::tui::app::{App, AppMode};
//!
//! let mut app = App::new();
//! assert_eq!(app.mode(), AppMode::Waiting);
//!
//! app.set_notice("Skipped IMG_0001.HEIC: unsupported media format");
//! assert!(app.notice().is_some());
//! ```

use std::time::Duration;

use crate::media::MediaInfo;
use crate::review::PairContext;
use crate::scanner::{FileEntry, MediaKind};
use crate::tui::theme::Theme;

/// What the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// No pair on screen yet
    #[default]
    Waiting,
    /// A pair is on screen awaiting a decision
    Reviewing,
}

/// One side of the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Scanned file
    pub entry: FileEntry,
    /// Probed media details
    pub info: MediaInfo,
}

/// The pair on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairView {
    /// Media kind of the pair
    pub kind: MediaKind,
    /// Source side (candidate for removal)
    pub source: Panel,
    /// Destination side
    pub dest: Panel,
}

impl PairView {
    /// Basename shared by both sides.
    #[must_use]
    pub fn basename(&self) -> std::borrow::Cow<'_, str> {
        self.source.entry.display_name()
    }

    /// Whether both sides have the same size and dimensions.
    #[must_use]
    pub fn looks_identical(&self) -> bool {
        self.source.info.size == self.dest.info.size
            && self.source.info.dimensions == self.dest.info.dimensions
            && self.source.info.duration == self.dest.info.duration
    }
}

/// Playback position of a video pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackView {
    /// Current position
    pub position: Duration,
    /// Clip length, when known
    pub duration: Option<Duration>,
}

impl PlaybackView {
    /// Progress through the clip as a ratio in `0.0..=1.0`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => (self.position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Review screen state.
#[derive(Debug, Clone, Default)]
pub struct App {
    mode: AppMode,
    pair: Option<PairView>,
    context: PairContext,
    playback: Option<PlaybackView>,
    notice: Option<String>,
    theme: Theme,
    accessible: bool,
}

impl App {
    /// Create an empty app with the default theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty app with a theme.
    #[must_use]
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Use ASCII borders and no color-only cues.
    #[must_use]
    pub fn with_accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    /// Whether accessible rendering is enabled.
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Active theme.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Show a pair. Clears playback state from the previous pair.
    pub fn show_pair(&mut self, pair: PairView) {
        self.pair = Some(pair);
        self.playback = None;
        self.mode = AppMode::Reviewing;
    }

    /// The pair on screen.
    #[must_use]
    pub fn pair(&self) -> Option<&PairView> {
        self.pair.as_ref()
    }

    /// Remove the pair from the screen.
    pub fn clear_pair(&mut self) {
        self.pair = None;
        self.playback = None;
        self.mode = AppMode::Waiting;
    }

    /// Session position of the upcoming pair.
    pub fn set_context(&mut self, context: PairContext) {
        self.context = context;
    }

    /// Session position of the pair on screen.
    #[must_use]
    pub fn context(&self) -> PairContext {
        self.context
    }

    /// Update the playback position.
    pub fn set_playback(&mut self, playback: PlaybackView) {
        self.playback = Some(playback);
    }

    /// Drop playback state.
    pub fn clear_playback(&mut self) {
        self.playback = None;
    }

    /// Playback state, for video pairs.
    #[must_use]
    pub fn playback(&self) -> Option<PlaybackView> {
        self.playback
    }

    /// Replace the notice line.
    pub fn set_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    /// The notice line.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Clear the notice line.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
