//! Review session state and the decision slot.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ReviewDecision, ReviewError, ReviewState};
use crate::scanner::{FileEntry, MediaKind};

/// Errors from the decision slot.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// A decision is already pending.
    #[error("a decision is already pending")]
    Occupied,

    /// The other end of the slot has been dropped.
    #[error("decision slot closed")]
    Closed,
}

/// Create a single-slot decision channel.
///
/// At most one decision can be pending. A second submission before the
/// first is consumed fails with [`SlotError::Occupied`].
#[must_use]
pub fn decision_slot() -> (DecisionSender, DecisionReceiver) {
    let (tx, rx) = mpsc::sync_channel(1);
    (DecisionSender { tx }, DecisionReceiver { rx })
}

/// Producer half of the decision slot, owned by the input side.
#[derive(Debug, Clone)]
pub struct DecisionSender {
    tx: SyncSender<ReviewDecision>,
}

impl DecisionSender {
    /// Offer a decision without blocking.
    ///
    /// # Errors
    ///
    /// [`SlotError::Occupied`] if a decision is already pending,
    /// [`SlotError::Closed`] if the review loop has gone away.
    pub fn try_submit(&self, decision: ReviewDecision) -> Result<(), SlotError> {
        self.tx.try_send(decision).map_err(|e| match e {
            TrySendError::Full(_) => SlotError::Occupied,
            TrySendError::Disconnected(_) => SlotError::Closed,
        })
    }
}

/// Consumer half of the decision slot, owned by the review loop.
#[derive(Debug)]
pub struct DecisionReceiver {
    rx: Receiver<ReviewDecision>,
}

impl DecisionReceiver {
    /// Wait up to `timeout` for a decision. `Ok(None)` means the wait timed out.
    ///
    /// # Errors
    ///
    /// [`SlotError::Closed`] once every sender is dropped and the slot is empty.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Option<ReviewDecision>, SlotError> {
        match self.rx.recv_timeout(timeout) {
            Ok(decision) => Ok(Some(decision)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SlotError::Closed),
        }
    }

    /// Take a pending decision, if any, without waiting.
    pub fn try_take(&self) -> Option<ReviewDecision> {
        match self.rx.try_recv() {
            Ok(decision) => Some(decision),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

/// A source file the operator marked for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalRecord {
    /// Shared basename
    pub basename: String,
    /// The source file to remove
    pub source: PathBuf,
    /// The destination copy it was compared against
    pub destination: PathBuf,
    /// Media kind of the pair
    pub kind: MediaKind,
    /// When the decision was taken
    pub decided_at: DateTime<Utc>,
}

/// A pair the surface could not show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndecidedPair {
    /// Shared basename
    pub basename: String,
    /// Source file
    pub source: PathBuf,
    /// Destination file
    pub destination: PathBuf,
    /// Media kind of the pair
    pub kind: MediaKind,
    /// Why the pair could not be previewed
    pub reason: String,
}

/// Summary returned when a review session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    /// Source files marked for removal, in decision order
    pub removals: Vec<RemovalRecord>,
    /// Pairs that could not be previewed
    pub undecided: Vec<UndecidedPair>,
    /// Pairs the operator chose to keep
    pub continued: usize,
    /// Groups skipped because they are neither image nor video
    pub skipped_other: usize,
    /// Whether the session ended early
    pub aborted: bool,
}

impl ReviewOutcome {
    /// Total number of pairs that received a decision or were undecidable.
    #[must_use]
    pub fn pairs_seen(&self) -> usize {
        self.removals.len() + self.continued + self.undecided.len()
    }

    /// Distinct source paths marked for removal, first decision wins.
    #[must_use]
    pub fn removal_paths(&self) -> Vec<&PathBuf> {
        let mut seen = std::collections::HashSet::new();
        self.removals
            .iter()
            .map(|r| &r.source)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// Transient state of one review run.
#[derive(Debug)]
pub struct ReviewSession {
    state: ReviewState,
    current: Option<(FileEntry, FileEntry)>,
    groups_reviewed: usize,
    outcome: ReviewOutcome,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ReviewState::Idle,
            current: None,
            groups_reviewed: 0,
            outcome: ReviewOutcome::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ReviewState {
        self.state
    }

    /// Move to `to`, rejecting illegal edges.
    ///
    /// # Errors
    ///
    /// [`ReviewError::InvalidTransition`] when `state -> to` is not allowed;
    /// the state is left unchanged.
    pub fn transition(&mut self, to: ReviewState) -> Result<(), ReviewError> {
        if !self.state.can_transition(to) {
            return Err(ReviewError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        log::trace!("Review state {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Set the pair being reviewed.
    pub fn set_current(&mut self, source: &FileEntry, dest: &FileEntry) {
        self.current = Some((source.clone(), dest.clone()));
    }

    /// The pair being reviewed, if any.
    #[must_use]
    pub fn current(&self) -> Option<(&FileEntry, &FileEntry)> {
        self.current.as_ref().map(|(s, d)| (s, d))
    }

    /// Count a reviewable group and return its 1-based number.
    pub fn begin_group(&mut self) -> usize {
        self.groups_reviewed += 1;
        self.groups_reviewed
    }

    /// Removals recorded so far.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.outcome.removals.len()
    }

    /// Record a `Remove` decision for the current pair.
    pub fn record_removal(&mut self) {
        if let Some((source, dest)) = self.current.take() {
            log::info!(
                "Marked for removal: {} (matches {})",
                source.path.display(),
                dest.path.display()
            );
            self.outcome.removals.push(RemovalRecord {
                basename: source.display_name().into_owned(),
                source: source.path,
                destination: dest.path,
                kind: source.kind,
                decided_at: Utc::now(),
            });
        }
    }

    /// Record a `Continue` decision for the current pair.
    pub fn record_continue(&mut self) {
        self.current = None;
        self.outcome.continued += 1;
    }

    /// Record that the current pair could not be previewed.
    pub fn record_undecided(&mut self, reason: impl Into<String>) {
        if let Some((source, dest)) = self.current.take() {
            self.outcome.undecided.push(UndecidedPair {
                basename: source.display_name().into_owned(),
                source: source.path,
                destination: dest.path,
                kind: source.kind,
                reason: reason.into(),
            });
        }
    }

    /// Count a group skipped for being neither image nor video.
    pub fn record_skipped_other(&mut self) {
        self.outcome.skipped_other += 1;
    }

    /// End the session and return its outcome.
    #[must_use]
    pub fn finish(mut self, aborted: bool) -> ReviewOutcome {
        self.outcome.aborted = aborted;
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entry(path: &str) -> FileEntry {
        FileEntry::new(PathBuf::from(path), 1, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_slot_holds_one_decision() {
        let (tx, rx) = decision_slot();
        assert_eq!(tx.try_submit(ReviewDecision::Remove), Ok(()));
        assert_eq!(tx.try_submit(ReviewDecision::Continue), Err(SlotError::Occupied));

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(10)),
            Ok(Some(ReviewDecision::Remove))
        );
        assert_eq!(rx.recv_timeout(Duration::from_millis(1)), Ok(None));
    }

    #[test]
    fn test_slot_closed_when_sender_dropped() {
        let (tx, rx) = decision_slot();
        tx.try_submit(ReviewDecision::Continue).unwrap();
        drop(tx);

        // Pending decision still delivered before Closed
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(10)),
            Ok(Some(ReviewDecision::Continue))
        );
        assert_eq!(rx.recv_timeout(Duration::from_millis(10)), Err(SlotError::Closed));
    }

    #[test]
    fn test_slot_closed_when_receiver_dropped() {
        let (tx, rx) = decision_slot();
        drop(rx);
        assert_eq!(tx.try_submit(ReviewDecision::Abort), Err(SlotError::Closed));
    }

    #[test]
    fn test_try_take() {
        let (tx, rx) = decision_slot();
        assert_eq!(rx.try_take(), None);
        tx.try_submit(ReviewDecision::Abort).unwrap();
        assert_eq!(rx.try_take(), Some(ReviewDecision::Abort));
        assert_eq!(rx.try_take(), None);
    }

    #[test]
    fn test_session_rejects_illegal_transition() {
        let mut session = ReviewSession::new();
        session.transition(ReviewState::Presenting).unwrap();
        session.transition(ReviewState::AwaitingDecision).unwrap();

        let err = session
            .transition(ReviewState::AwaitingDecision)
            .unwrap_err();
        assert!(matches!(err, ReviewError::InvalidTransition { .. }));
        assert_eq!(session.state(), ReviewState::AwaitingDecision);
    }

    #[test]
    fn test_session_records() {
        let mut session = ReviewSession::new();

        session.set_current(&entry("/s/a.HEIC"), &entry("/d/a.HEIC"));
        session.record_removal();
        session.set_current(&entry("/s/b.MOV"), &entry("/d/b.MOV"));
        session.record_continue();
        session.set_current(&entry("/s/c.HEIC"), &entry("/d/c.HEIC"));
        session.record_undecided("bad header");
        session.record_skipped_other();

        assert_eq!(session.removal_count(), 1);
        assert!(session.current().is_none());

        let outcome = session.finish(false);
        assert_eq!(outcome.removals.len(), 1);
        assert_eq!(outcome.removals[0].basename, "a.HEIC");
        assert_eq!(outcome.removals[0].source, PathBuf::from("/s/a.HEIC"));
        assert_eq!(outcome.removals[0].destination, PathBuf::from("/d/a.HEIC"));
        assert_eq!(outcome.removals[0].kind, MediaKind::Image);
        assert_eq!(outcome.continued, 1);
        assert_eq!(outcome.undecided[0].reason, "bad header");
        assert_eq!(outcome.skipped_other, 1);
        assert_eq!(outcome.pairs_seen(), 3);
        assert!(!outcome.aborted);
    }

    #[test]
    fn test_removal_paths_are_distinct() {
        let mut session = ReviewSession::new();
        session.set_current(&entry("/s/dup.HEIC"), &entry("/d/x/dup.HEIC"));
        session.record_removal();
        session.set_current(&entry("/s/dup.HEIC"), &entry("/d/y/dup.HEIC"));
        session.record_removal();

        let outcome = session.finish(true);
        assert_eq!(outcome.removals.len(), 2);
        assert_eq!(outcome.removal_paths(), vec![&PathBuf::from("/s/dup.HEIC")]);
        assert!(outcome.aborted);
    }
}
