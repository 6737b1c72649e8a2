//! Ctrl+C and SIGTERM handling.
//!
//! A single shared `AtomicBool` is set when the process is asked to stop.
//! The scanner, the walker and the review loop all poll it, so an
//! interrupt ends the session the same way an operator abort does: playback
//! stopped, input thread joined, terminal restored.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupereview::signal::install_handler;
//! use dupereview::duplicates::FinderConfig;
//!
//! let handler = install_handler();
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for an interrupted run (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown, as a signal would.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to the finder and the review loop.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide signal handler, or reuse the installed one.
///
/// The reused handler has its flag cleared. If `ctrlc` refuses to register
/// (another handler already owns the signal) an unhooked handler is
/// returned instead; it still honours [`ShutdownHandler::request_shutdown`].
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();
        let installed = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            log::info!("Shutdown signal received");
        });
        if let Err(e) = installed {
            log::debug!("Signal handler not installed ({}), using unhooked handler", e);
        }
        handler
    });
    handler.reset();
    handler.clone()
}

/// Create a handler without installing any signal hooks.
///
/// ```
/// use dupereview::signal::create_handler;
/// assert!(!create_handler().is_shutdown_requested());
/// ```
#[must_use]
pub fn create_handler() -> ShutdownHandler {
    ShutdownHandler::new()
}
