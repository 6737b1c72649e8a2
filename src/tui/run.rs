//! Terminal review entry point.
//!
//! This module owns terminal setup and cleanup and wires a
//! [`TerminalSurface`] to a [`ReviewLoop`].
//!
//! # Terminal Management
//!
//! The review screen takes over the terminal by:
//! - Enabling raw mode (unbuffered input, no echo)
//! - Entering the alternate screen buffer
//! - Hiding the cursor
//!
//! All these changes are reverted on exit, including on panic.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use dupereview::tui::{run_review, ReviewOptions};
//!
//! let outcome = run_review(Vec::new(), &ReviewOptions::default(), Arc::new(AtomicBool::new(false)))
//!     .unwrap();
//! assert!(outcome.removals.is_empty());
//! ```

use std::io::{self, Stdout};
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Once};

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use thiserror::Error;

use super::app::App;
use super::surface::{TerminalSurface, DEFAULT_FPS};
use super::theme::Theme;
use crate::duplicates::DuplicateGroup;
use crate::review::{decision_slot, ReviewError, ReviewLoop, ReviewOutcome};

/// Error type for the terminal review.
#[derive(Debug, Error)]
pub enum TuiError {
    /// I/O error from terminal operations.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The review loop failed.
    #[error("review failed: {0}")]
    Review(#[from] ReviewError),
}

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, TuiError>;

/// Display settings for the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Color palette
    pub theme: Theme,
    /// Playback frame rate
    pub fps: u32,
    /// ASCII borders and textual difference markers
    pub accessible: bool,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            fps: DEFAULT_FPS,
            accessible: false,
        }
    }
}

/// Review `groups` interactively on the terminal.
///
/// Returns when the groups are exhausted, the operator aborts, or the
/// shutdown flag is set. The terminal is restored before returning.
///
/// # Errors
///
/// Returns `TuiError::Io` if the terminal cannot be set up and
/// `TuiError::Review` if the review loop fails.
pub fn run_review<I>(
    groups: I,
    options: &ReviewOptions,
    shutdown_flag: Arc<AtomicBool>,
) -> TuiResult<ReviewOutcome>
where
    I: IntoIterator<Item = DuplicateGroup>,
{
    let (sender, receiver) = decision_slot();
    let app = App::with_theme(options.theme).with_accessible(options.accessible);
    let mut surface = TerminalSurface::stdout(app, options.fps, sender)?;

    let outcome = ReviewLoop::new(&mut surface, receiver)
        .with_shutdown_flag(shutdown_flag)
        .run(groups);

    // Restores the terminal and joins the input thread before reporting
    drop(surface);

    let outcome = outcome?;
    log::info!(
        "Review finished: {} marked for removal, {} kept, {} undecided{}",
        outcome.removals.len(),
        outcome.continued,
        outcome.undecided.len(),
        if outcome.aborted { " (aborted)" } else { "" }
    );
    Ok(outcome)
}

/// Restore the terminal if a panic unwinds through the review screen.
///
/// Installed once per process; the previous hook still runs afterwards.
pub(crate) fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));
    });
}

/// Set up the terminal for the review screen.
pub(crate) fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    log::debug!("Setting up terminal");

    terminal::enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide) {
        restore_terminal();
        return Err(e);
    }

    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            restore_terminal();
            Err(e)
        }
    }
}

/// Restore the terminal to its original state. Errors are ignored.
pub(crate) fn restore_terminal() {
    log::debug!("Restoring terminal");
    let _ = terminal::disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    );
}
