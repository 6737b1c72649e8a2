//! Terminal User Interface module.
//!
//! This module provides the interactive review screen using ratatui with
//! the crossterm backend.
//!
//! # Overview
//!
//! - [`app`]: Screen state (pair on display, session position, playback)
//! - [`events`]: Key handling on the input thread
//! - [`surface`]: [`TerminalSurface`], the terminal [`PreviewSurface`](crate::review::PreviewSurface)
//! - [`ui`]: Ratatui rendering
//! - [`theme`]: Color palettes
//! - [`run`]: Terminal setup and the [`run_review`] entry point
//!
//! # Architecture
//!
//! Two threads touch the terminal:
//! 1. The input thread reads key events and pushes decisions into the slot
//! 2. The UI thread runs the review loop, which redraws on every pump
//!
//! Only the UI thread writes to the screen.

pub mod app;
pub mod events;
pub mod run;
pub mod surface;
pub mod theme;
pub mod ui;

// Re-export commonly used types
pub use app::{App, AppMode};
pub use run::{run_review, ReviewOptions, TuiError, TuiResult};
pub use surface::TerminalSurface;
pub use theme::Theme;
pub use ui::{format_size, render, truncate_path, truncate_string};
