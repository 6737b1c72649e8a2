//! The terminal preview surface.
//!
//! [`TerminalSurface`] implements [`PreviewSurface`] on top of a ratatui
//! terminal. Each pair is probed with [`media::probe`] and drawn as two
//! panels; video pairs also get a [`PlaybackPump`] whose position is shown
//! as a gauge and refreshed on every [`pump`](PreviewSurface::pump).

use std::io::{self, Stdout};
use std::time::Duration;

use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use super::app::{App, Panel, PairView, PlaybackView};
use super::events::InputThread;
use super::run::{install_panic_hook, restore_terminal, setup_terminal};
use super::ui::render;
use crate::media::{self, MediaInfo};
use crate::review::{DecisionSender, PairContext, PlaybackPump, PreviewSurface, SurfaceError};
use crate::scanner::{FileEntry, MediaKind};

/// Default playback frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Highest accepted frame rate.
pub const MAX_FPS: u32 = 120;

/// Frame interval for a frame rate, clamped to `1..=MAX_FPS`.
#[must_use]
pub fn frame_interval_for(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.clamp(1, MAX_FPS)
}

/// A [`PreviewSurface`] drawing to a ratatui terminal.
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    app: App,
    frame_interval: Duration,
    playback: Option<PlaybackPump>,
    input: Option<InputThread>,
    owns_terminal: bool,
}

impl TerminalSurface<CrosstermBackend<Stdout>> {
    /// Take over stdout and start reading decision keys into `sender`.
    ///
    /// The terminal is restored when the surface is dropped, and on panic.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up or the input
    /// thread cannot be started.
    pub fn stdout(app: App, fps: u32, sender: DecisionSender) -> io::Result<Self> {
        install_panic_hook();
        let terminal = setup_terminal()?;
        let mut surface = Self::with_terminal(terminal, app, fps);
        surface.owns_terminal = true;
        surface.input = Some(InputThread::spawn(sender)?);
        surface.draw()?;
        Ok(surface)
    }
}

impl<B: Backend> TerminalSurface<B> {
    /// Wrap an existing backend. No input thread is started and the terminal
    /// is left as is on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report its size.
    pub fn with_backend(backend: B, app: App, fps: u32) -> io::Result<Self> {
        Ok(Self::with_terminal(Terminal::new(backend)?, app, fps))
    }

    fn with_terminal(terminal: Terminal<B>, app: App, fps: u32) -> Self {
        Self {
            terminal,
            app,
            frame_interval: frame_interval_for(fps),
            playback: None,
            input: None,
            owns_terminal: false,
        }
    }

    /// Screen state.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    /// Whether a video pump is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(PlaybackPump::is_running)
    }

    fn draw(&mut self) -> io::Result<()> {
        let app = &self.app;
        self.terminal.draw(|frame| render(frame, app))?;
        Ok(())
    }

    fn probe_pair(
        kind: MediaKind,
        source: &FileEntry,
        dest: &FileEntry,
    ) -> Result<PairView, SurfaceError> {
        let panel = |entry: &FileEntry| -> Result<Panel, SurfaceError> {
            let info: MediaInfo = media::probe(entry)?;
            Ok(Panel {
                entry: entry.clone(),
                info,
            })
        };
        Ok(PairView {
            kind,
            source: panel(source)?,
            dest: panel(dest)?,
        })
    }

    fn sync_playback(&mut self) {
        if let Some(pump) = &self.playback {
            self.app.set_playback(PlaybackView {
                position: pump.position(),
                duration: pump.duration(),
            });
        }
    }
}

impl<B: Backend> PreviewSurface for TerminalSurface<B> {
    fn display_image_pair(
        &mut self,
        source: &FileEntry,
        dest: &FileEntry,
    ) -> Result<(), SurfaceError> {
        let pair = Self::probe_pair(MediaKind::Image, source, dest)?;
        self.app.show_pair(pair);
        self.draw().map_err(SurfaceError::Terminal)
    }

    fn display_video_pair(
        &mut self,
        source: &FileEntry,
        dest: &FileEntry,
    ) -> Result<(), SurfaceError> {
        let pair = Self::probe_pair(MediaKind::Video, source, dest)?;
        let duration = pair.source.info.duration.or(pair.dest.info.duration);
        self.app.show_pair(pair);

        self.stop_playback();
        let pump =
            PlaybackPump::start(self.frame_interval, duration).map_err(SurfaceError::Terminal)?;
        self.playback = Some(pump);
        self.sync_playback();
        self.draw().map_err(SurfaceError::Terminal)
    }

    fn stop_playback(&mut self) {
        if let Some(mut pump) = self.playback.take() {
            pump.stop();
        }
        self.app.clear_playback();
    }

    fn show_notice(&mut self, message: &str) {
        self.app.set_notice(message);
        if let Err(e) = self.draw() {
            log::warn!("Failed to draw notice: {}", e);
        }
    }

    fn pump(&mut self) -> Result<(), SurfaceError> {
        self.sync_playback();
        self.draw().map_err(SurfaceError::Terminal)
    }

    fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn set_context(&mut self, context: PairContext) {
        self.app.set_context(context);
    }
}

impl<B: Backend> Drop for TerminalSurface<B> {
    fn drop(&mut self) {
        self.stop_playback();
        if let Some(mut input) = self.input.take() {
            input.stop();
        }
        if self.owns_terminal {
            restore_terminal();
        }
    }
}
