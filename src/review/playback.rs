//! Frame pump for video previews.
//!
//! A [`PlaybackPump`] runs on its own thread and advances a shared playback
//! position once per frame. It checks its [`CancellationToken`] every
//! frame; [`PlaybackPump::stop`] cancels and joins, so the thread never
//! outlives the pair it was started for.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared between a pump and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State shared with the pump thread.
#[derive(Debug, Default)]
struct Clock {
    position_micros: AtomicU64,
    frames: AtomicU64,
}

/// A running playback position for one video pair.
#[derive(Debug)]
pub struct PlaybackPump {
    token: CancellationToken,
    clock: Arc<Clock>,
    handle: Option<JoinHandle<()>>,
    duration: Option<Duration>,
}

impl PlaybackPump {
    /// Start a pump advancing by `frame_interval` each frame.
    ///
    /// When `duration` is known the position wraps to zero at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn start(frame_interval: Duration, duration: Option<Duration>) -> std::io::Result<Self> {
        let token = CancellationToken::new();
        let clock = Arc::new(Clock::default());
        let interval = frame_interval.max(Duration::from_millis(1));

        let thread_token = token.clone();
        let thread_clock = Arc::clone(&clock);
        let handle = thread::Builder::new()
            .name("playback-pump".to_string())
            .spawn(move || pump_frames(&thread_token, &thread_clock, interval, duration))?;

        log::debug!("Playback started ({:?} per frame)", interval);
        Ok(Self {
            token,
            clock,
            handle: Some(handle),
            duration,
        })
    }

    /// Current playback position.
    #[must_use]
    pub fn position(&self) -> Duration {
        Duration::from_micros(self.clock.position_micros.load(Ordering::Relaxed))
    }

    /// Frames advanced so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.clock.frames.load(Ordering::Relaxed)
    }

    /// Running time of the clip, if known.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Whether the pump thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// A clone of this pump's cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the pump and wait for its thread to exit. Idempotent.
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::warn!("Playback pump thread panicked");
            }
            log::debug!("Playback stopped after {} frames", self.frames());
        }
    }
}

impl Drop for PlaybackPump {
    fn drop(&mut self) {
        self.stop();
    }
}

fn pump_frames(
    token: &CancellationToken,
    clock: &Clock,
    interval: Duration,
    duration: Option<Duration>,
) {
    let step = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX);
    let wrap = duration
        .and_then(|d| u64::try_from(d.as_micros()).ok())
        .filter(|&d| d > 0);
    let mut next_frame = Instant::now() + interval;

    while !token.is_cancelled() {
        let now = Instant::now();
        if now < next_frame {
            // Woken early by stop(); re-check the token
            thread::park_timeout(next_frame - now);
            continue;
        }
        next_frame += interval;

        let current = clock.position_micros.load(Ordering::Relaxed);
        let mut advanced = current.saturating_add(step);
        if let Some(end) = wrap {
            advanced %= end;
        }
        clock.position_micros.store(advanced, Ordering::Relaxed);
        clock.frames.fetch_add(1, Ordering::Relaxed);
    }
}
