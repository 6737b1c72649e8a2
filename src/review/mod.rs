//! Interactive review of duplicate pairs.
//!
//! The review loop takes the groups produced by
//! [`DuplicateFinder`](crate::duplicates::DuplicateFinder), shows each
//! (source, destination) pair on a [`PreviewSurface`] and waits for the
//! operator's [`ReviewDecision`]. `Remove` decisions are recorded, never
//! executed.
//!
//! # Architecture
//!
//! - [`engine`]: the [`ReviewLoop`] state machine
//! - [`session`]: the decision slot and the records a session accumulates
//! - [`playback`]: the frame pump behind video previews
//!
//! Decisions reach the loop through a single-slot channel created by
//! [`decision_slot`]. The surface (or its input thread) owns the
//! [`DecisionSender`]; the loop owns the [`DecisionReceiver`].

pub mod engine;
pub mod playback;
pub mod session;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::media::MediaError;
use crate::scanner::FileEntry;

pub use engine::ReviewLoop;
pub use playback::{CancellationToken, PlaybackPump};
pub use session::{
    decision_slot, DecisionReceiver, DecisionSender, RemovalRecord, ReviewOutcome, ReviewSession,
    SlotError, UndecidedPair,
};

/// Operator verdict on one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    /// Keep the source copy and move on
    Continue,
    /// Mark the source copy for removal
    Remove,
    /// End the session
    Abort,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Remove => write!(f, "remove"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Phase of the review loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewState {
    /// Between pairs; the next group may be fetched
    Idle,
    /// A pair is being handed to the surface
    Presenting,
    /// Blocked on the decision slot
    AwaitingDecision,
    /// Acting on a received decision
    Deciding,
}

impl ReviewState {
    /// Whether `self -> to` is a legal edge.
    ///
    /// `Presenting -> Idle` is taken when the surface cannot show a pair.
    #[must_use]
    pub fn can_transition(self, to: ReviewState) -> bool {
        use ReviewState::{AwaitingDecision, Deciding, Idle, Presenting};
        matches!(
            (self, to),
            (Idle, Presenting)
                | (Presenting, AwaitingDecision)
                | (Presenting, Idle)
                | (AwaitingDecision, Deciding)
                | (Deciding, Presenting)
                | (Deciding, Idle)
        )
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::AwaitingDecision => "awaiting decision",
            Self::Deciding => "deciding",
        };
        f.write_str(name)
    }
}

/// Where the current pair sits in the session, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairContext {
    /// 1-based index of the current group among reviewable groups
    pub group_number: usize,
    /// 1-based index of the destination within its group
    pub match_number: usize,
    /// Number of destinations in the group
    pub match_count: usize,
    /// Removals recorded so far
    pub removals: usize,
}

/// Errors a preview surface can report.
#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    /// The file cannot be described by this surface.
    #[error("unsupported media format for {path}: {reason}")]
    UnsupportedMediaFormat {
        /// File that could not be shown
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// A file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The display itself failed.
    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),
}

impl From<MediaError> for SurfaceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Unsupported { path, reason } => Self::UnsupportedMediaFormat { path, reason },
            MediaError::Io { path, source } => Self::Io { path, source },
        }
    }
}

/// A UI capable of showing a pair and collecting a decision.
///
/// Display calls must not block waiting for the operator; decisions arrive
/// separately through the [`DecisionSender`] the surface was given.
pub trait PreviewSurface {
    /// Show two images side by side.
    fn display_image_pair(&mut self, source: &FileEntry, dest: &FileEntry)
        -> Result<(), SurfaceError>;

    /// Show two videos side by side and start playback.
    fn display_video_pair(&mut self, source: &FileEntry, dest: &FileEntry)
        -> Result<(), SurfaceError>;

    /// Stop any playback started for the current pair. Must be idempotent.
    fn stop_playback(&mut self);

    /// Tell the operator something without waiting for a reply.
    fn show_notice(&mut self, message: &str);

    /// Process pending redraws and input. Called once per frame interval
    /// while a decision is awaited.
    fn pump(&mut self) -> Result<(), SurfaceError>;

    /// How long the loop waits for a decision between pumps.
    fn frame_interval(&self) -> Duration;

    /// Position of the upcoming pair within the session.
    fn set_context(&mut self, _context: PairContext) {}
}

/// Errors that end a review session.
#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    /// The loop attempted an illegal state change.
    #[error("invalid review transition from {from} to {to}")]
    InvalidTransition {
        /// State before the attempted change
        from: ReviewState,
        /// Requested state
        to: ReviewState,
    },

    /// The surface failed outside of a single pair (e.g. while pumping).
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
