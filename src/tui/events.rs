//! Keyboard input for the review screen.
//!
//! # Overview
//!
//! [`InputThread`] reads crossterm events on a dedicated thread and turns
//! decision keys into [`ReviewDecision`]s pushed through the decision slot:
//!
//! | Key            | Decision   |
//! |----------------|------------|
//! | `r`            | `Remove`   |
//! | `c`, `Enter`   | `Continue` |
//! | `q`, `Esc`     | `Abort`    |
//! | `Ctrl+C`       | `Abort`    |
//!
//! The thread never touches rendering state.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::review::{CancellationToken, DecisionSender, ReviewDecision, SlotError};

/// How long the input thread blocks in `poll` before re-checking its token.
pub const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Map a key press to a decision. Releases and repeats are ignored.
#[must_use]
pub fn key_to_decision(key: KeyEvent) -> Option<ReviewDecision> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(ReviewDecision::Abort),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('r' | 'R') => Some(ReviewDecision::Remove),
        KeyCode::Char('c' | 'C') | KeyCode::Enter => Some(ReviewDecision::Continue),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(ReviewDecision::Abort),
        _ => None,
    }
}

/// Offer a decision to the slot.
///
/// Returns `false` once the review loop has gone away.
pub fn forward_decision(sender: &DecisionSender, decision: ReviewDecision) -> bool {
    match sender.try_submit(decision) {
        Ok(()) => {
            log::debug!("Decision submitted: {}", decision);
            true
        }
        Err(SlotError::Occupied) => {
            log::debug!("Decision {} dropped, one is already pending", decision);
            true
        }
        Err(SlotError::Closed) => false,
    }
}

/// The thread reading terminal input for the review screen.
#[derive(Debug)]
pub struct InputThread {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl InputThread {
    /// Start reading input and forwarding decisions to `sender`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(sender: DecisionSender) -> std::io::Result<Self> {
        let token = CancellationToken::new();
        let thread_token = token.clone();
        let handle = thread::Builder::new()
            .name("review-input".to_string())
            .spawn(move || read_input(&sender, &thread_token))?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    /// Stop reading input and join the thread. Idempotent.
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Input thread panicked");
            }
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_input(sender: &DecisionSender, token: &CancellationToken) {
    while !token.is_cancelled() {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::warn!("Terminal input failed: {}", e);
                break;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("Terminal input failed: {}", e);
                break;
            }
        };
        if let Some(decision) = key_to_decision(key) {
            if !forward_decision(sender, decision) {
                break;
            }
        }
    }
    log::debug!("Input thread exiting");
}
