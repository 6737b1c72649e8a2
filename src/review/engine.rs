//! The review loop.
//!
//! ```text
//! Idle --> Presenting --> AwaitingDecision --> Deciding --> Presenting (next match)
//!              |                                   |
//!              +--> Idle (pair not previewable)    +--> Idle (group done / abort)
//! ```
//!
//! Every state change goes through [`ReviewSession::transition`], which
//! rejects edges not drawn above.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::session::{DecisionReceiver, ReviewOutcome, ReviewSession, SlotError};
use super::{PairContext, PreviewSurface, ReviewDecision, ReviewError, ReviewState};
use crate::duplicates::DuplicateGroup;
use crate::scanner::{FileEntry, MediaKind};

/// What the loop does after a pair.
enum Flow {
    Next,
    Abort,
}

/// Drives a [`PreviewSurface`] through a sequence of duplicate groups.
pub struct ReviewLoop<'s, S: PreviewSurface + ?Sized> {
    surface: &'s mut S,
    decisions: DecisionReceiver,
    shutdown_flag: Option<Arc<AtomicBool>>,
    session: ReviewSession,
}

impl<'s, S: PreviewSurface + ?Sized> ReviewLoop<'s, S> {
    /// Create a loop that presents on `surface` and reads from `decisions`.
    pub fn new(surface: &'s mut S, decisions: DecisionReceiver) -> Self {
        Self {
            surface,
            decisions,
            shutdown_flag: None,
            session: ReviewSession::new(),
        }
    }

    /// Treat the shutdown flag as an `Abort` decision.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Review every pair in `groups` until they run out or the operator aborts.
    ///
    /// Groups are pulled lazily; after an abort no further group is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Surface`] when the surface fails while
    /// pumping (the display is gone), and [`ReviewError::InvalidTransition`]
    /// if the state machine is violated.
    pub fn run<I>(mut self, groups: I) -> Result<ReviewOutcome, ReviewError>
    where
        I: IntoIterator<Item = DuplicateGroup>,
    {
        let mut groups = groups.into_iter();
        let mut aborted = false;

        'groups: loop {
            // Before each fetch, which walks more of the source tree
            if self.is_shutdown_requested() {
                log::info!("Shutdown requested, ending review");
                aborted = true;
                break;
            }
            if self.take_pending_abort() {
                aborted = true;
                break;
            }
            let Some(group) = groups.next() else {
                break;
            };

            let kind = group.kind();
            if !kind.is_reviewable() {
                log::debug!("Skipping non-media group {}", group.display_name());
                self.session.record_skipped_other();
                continue;
            }

            let group_number = self.session.begin_group();
            let match_count = group.len();
            for (index, dest) in group.destinations.iter().enumerate() {
                let context = PairContext {
                    group_number,
                    match_number: index + 1,
                    match_count,
                    removals: self.session.removal_count(),
                };
                if let Flow::Abort = self.review_pair(kind, &group.source, dest, context)? {
                    aborted = true;
                    break 'groups;
                }
            }

            if self.session.state() == ReviewState::Deciding {
                self.session.transition(ReviewState::Idle)?;
            }
        }

        if self.session.state() == ReviewState::Deciding {
            self.session.transition(ReviewState::Idle)?;
        }

        let outcome = self.session.finish(aborted);
        log::info!(
            "Review finished: {} marked for removal, {} kept, {} undecided{}",
            outcome.removals.len(),
            outcome.continued,
            outcome.undecided.len(),
            if outcome.aborted { " (aborted)" } else { "" }
        );
        Ok(outcome)
    }

    fn review_pair(
        &mut self,
        kind: MediaKind,
        source: &FileEntry,
        dest: &FileEntry,
        context: PairContext,
    ) -> Result<Flow, ReviewError> {
        self.session.transition(ReviewState::Presenting)?;
        self.session.set_current(source, dest);

        if self.take_pending_abort() {
            self.surface.stop_playback();
            self.session.transition(ReviewState::Idle)?;
            return Ok(Flow::Abort);
        }

        self.surface.set_context(context);
        let shown = match kind {
            MediaKind::Image => self.surface.display_image_pair(source, dest),
            MediaKind::Video => self.surface.display_video_pair(source, dest),
            MediaKind::Other => Ok(()),
        };

        if let Err(e) = shown {
            log::warn!("Cannot preview {}: {}", source.display_name(), e);
            self.surface.stop_playback();
            self.surface
                .show_notice(&format!("Skipped {}: {}", source.display_name(), e));
            self.session.record_undecided(e.to_string());
            self.session.transition(ReviewState::Idle)?;
            return Ok(Flow::Next);
        }

        self.session.transition(ReviewState::AwaitingDecision)?;
        let decision = self.await_decision();
        self.session.transition(ReviewState::Deciding)?;
        self.surface.stop_playback();

        match decision? {
            ReviewDecision::Remove => {
                self.session.record_removal();
                Ok(Flow::Next)
            }
            ReviewDecision::Continue => {
                self.session.record_continue();
                Ok(Flow::Next)
            }
            ReviewDecision::Abort => Ok(Flow::Abort),
        }
    }

    /// Drain a decision made while no pair was on screen.
    ///
    /// Continue and Remove do not apply to a pair the operator has not seen
    /// and are dropped; an Abort is honoured.
    fn take_pending_abort(&mut self) -> bool {
        match self.decisions.try_take() {
            Some(ReviewDecision::Abort) => {
                log::info!("Abort received between pairs, ending review");
                true
            }
            Some(stale) => {
                log::debug!("Discarding decision '{}' made before the pair was shown", stale);
                false
            }
            None => false,
        }
    }

    /// Block on the decision slot, pumping the surface every frame interval.
    fn await_decision(&mut self) -> Result<ReviewDecision, ReviewError> {
        loop {
            if self.is_shutdown_requested() {
                return Ok(ReviewDecision::Abort);
            }

            match self.decisions.recv_timeout(self.surface.frame_interval()) {
                Ok(Some(decision)) => {
                    log::debug!("Decision: {}", decision);
                    return Ok(decision);
                }
                Ok(None) => self.surface.pump()?,
                Err(SlotError::Closed | SlotError::Occupied) => {
                    log::info!("Decision input closed, ending review");
                    return Ok(ReviewDecision::Abort);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::session::{decision_slot, DecisionSender};
    use super::super::SurfaceError;
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn entry(path: &str) -> FileEntry {
        FileEntry::new(PathBuf::from(path), 1, SystemTime::UNIX_EPOCH)
    }

    fn group(source: &str, dests: &[&str]) -> DuplicateGroup {
        DuplicateGroup::new(entry(source), dests.iter().map(|d| entry(d)).collect())
    }

    /// Surface that answers each display with the next scripted decision.
    struct ScriptedSurface {
        tx: DecisionSender,
        script: VecDeque<ReviewDecision>,
        calls: Vec<String>,
        fail_on: Option<&'static str>,
        /// Submitted once, the first time playback is stopped
        on_stop: Option<ReviewDecision>,
    }

    impl ScriptedSurface {
        fn new(tx: DecisionSender, script: &[ReviewDecision]) -> Self {
            Self {
                tx,
                script: script.iter().copied().collect(),
                calls: Vec::new(),
                fail_on: None,
                on_stop: None,
            }
        }

        fn answer(&mut self) {
            if let Some(decision) = self.script.pop_front() {
                self.tx.try_submit(decision).unwrap();
            }
        }

        fn display(&mut self, tag: &str, dest: &FileEntry) -> Result<(), SurfaceError> {
            self.calls.push(format!("{tag}:{}", dest.path.display()));
            if self.fail_on.is_some_and(|f| dest.path.ends_with(f)) {
                return Err(SurfaceError::UnsupportedMediaFormat {
                    path: dest.path.clone(),
                    reason: "test".to_string(),
                });
            }
            self.answer();
            Ok(())
        }
    }

    impl PreviewSurface for ScriptedSurface {
        fn display_image_pair(
            &mut self,
            _source: &FileEntry,
            dest: &FileEntry,
        ) -> Result<(), SurfaceError> {
            self.display("image", dest)
        }

        fn display_video_pair(
            &mut self,
            _source: &FileEntry,
            dest: &FileEntry,
        ) -> Result<(), SurfaceError> {
            self.display("video", dest)
        }

        fn stop_playback(&mut self) {
            self.calls.push("stop".to_string());
            if let Some(decision) = self.on_stop.take() {
                self.tx.try_submit(decision).unwrap();
            }
        }

        fn show_notice(&mut self, _message: &str) {
            self.calls.push("notice".to_string());
        }

        fn pump(&mut self) -> Result<(), SurfaceError> {
            Ok(())
        }

        fn frame_interval(&self) -> Duration {
            Duration::from_millis(1)
        }
    }

    #[test]
    fn test_each_destination_presented_in_order() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(
            tx,
            &[ReviewDecision::Continue, ReviewDecision::Remove],
        );

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![group("/s/dup.HEIC", &["/x/dup.HEIC", "/y/dup.HEIC"])])
            .unwrap();

        assert_eq!(
            surface.calls,
            vec!["image:/x/dup.HEIC", "stop", "image:/y/dup.HEIC", "stop"]
        );
        assert_eq!(outcome.continued, 1);
        assert_eq!(outcome.removals.len(), 1);
        assert_eq!(outcome.removals[0].destination, PathBuf::from("/y/dup.HEIC"));
        assert!(!outcome.aborted);
    }

    #[test]
    fn test_other_groups_never_displayed() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[ReviewDecision::Continue]);

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![
                group("/s/notes.txt", &["/d/notes.txt"]),
                group("/s/clip.MOV", &["/d/clip.MOV"]),
            ])
            .unwrap();

        assert_eq!(surface.calls, vec!["video:/d/clip.MOV", "stop"]);
        assert_eq!(outcome.skipped_other, 1);
        assert_eq!(outcome.continued, 1);
    }

    #[test]
    fn test_abort_stops_and_fetches_nothing_more() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[ReviewDecision::Abort]);
        let mut fetched = 0;
        let groups = (0..3).map(|i| {
            fetched += 1;
            group(&format!("/s/{i}.MOV"), &[format!("/d/{i}.MOV").as_str()])
        });

        let outcome = ReviewLoop::new(&mut surface, rx).run(groups).unwrap();

        assert!(outcome.aborted);
        assert_eq!(fetched, 1);
        assert_eq!(surface.calls, vec!["video:/d/0.MOV", "stop"]);
    }

    #[test]
    fn test_unsupported_pair_recorded_and_loop_continues() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[ReviewDecision::Remove]);
        surface.fail_on = Some("bad.HEIC");

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![
                group("/s/bad.HEIC", &["/d/bad.HEIC"]),
                group("/s/good.HEIC", &["/d/good.HEIC"]),
            ])
            .unwrap();

        assert_eq!(
            surface.calls,
            vec!["image:/d/bad.HEIC", "stop", "notice", "image:/d/good.HEIC", "stop"]
        );
        assert_eq!(outcome.undecided.len(), 1);
        assert_eq!(outcome.undecided[0].destination, PathBuf::from("/d/bad.HEIC"));
        assert_eq!(outcome.removals.len(), 1);
    }

    #[test]
    fn test_closed_slot_is_abort() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[]);
        // Replace the scripted sender so nothing can ever answer
        let (dead_tx, _) = decision_slot();
        surface.tx = dead_tx;

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![group("/s/a.HEIC", &["/d/a.HEIC"])])
            .unwrap();

        assert!(outcome.aborted);
        assert_eq!(surface.calls, vec!["image:/d/a.HEIC", "stop"]);
    }

    #[test]
    fn test_shutdown_flag_is_abort() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[]);
        let flag = Arc::new(AtomicBool::new(true));
        let mut fetched = 0;
        let groups = (0..2).map(|i| {
            fetched += 1;
            group(&format!("/s/{i}.HEIC"), &[format!("/d/{i}.HEIC").as_str()])
        });

        let outcome = ReviewLoop::new(&mut surface, rx)
            .with_shutdown_flag(flag)
            .run(groups)
            .unwrap();

        assert!(outcome.aborted);
        assert_eq!(fetched, 0);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_pending_abort_ends_before_any_display() {
        let (tx, rx) = decision_slot();
        tx.try_submit(ReviewDecision::Abort).unwrap();
        let mut surface = ScriptedSurface::new(
            tx,
            &[ReviewDecision::Continue, ReviewDecision::Continue],
        );
        let mut fetched = 0;
        let groups = ["a", "b"].into_iter().map(|name| {
            fetched += 1;
            group(&format!("/s/{name}.HEIC"), &[format!("/d/{name}.HEIC").as_str()])
        });

        let outcome = ReviewLoop::new(&mut surface, rx).run(groups).unwrap();

        assert!(outcome.aborted);
        assert_eq!(fetched, 0);
        assert!(surface.calls.is_empty());
        assert_eq!(outcome.continued, 0);
    }

    #[test]
    fn test_abort_pressed_between_matches_is_honoured() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[ReviewDecision::Continue]);
        surface.on_stop = Some(ReviewDecision::Abort);

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![
                group("/s/dup.HEIC", &["/x/dup.HEIC", "/y/dup.HEIC"]),
                group("/s/next.HEIC", &["/d/next.HEIC"]),
            ])
            .unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.continued, 1);
        assert_eq!(surface.calls, vec!["image:/x/dup.HEIC", "stop", "stop"]);
    }

    #[test]
    fn test_stale_continue_is_discarded() {
        let (tx, rx) = decision_slot();
        tx.try_submit(ReviewDecision::Continue).unwrap();
        let mut surface = ScriptedSurface::new(tx, &[ReviewDecision::Remove]);

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(vec![group("/s/a.HEIC", &["/d/a.HEIC"])])
            .unwrap();

        assert!(!outcome.aborted);
        assert_eq!(outcome.continued, 0);
        assert_eq!(outcome.removals.len(), 1);
    }

    #[test]
    fn test_empty_sequence() {
        let (tx, rx) = decision_slot();
        let mut surface = ScriptedSurface::new(tx, &[]);

        let outcome = ReviewLoop::new(&mut surface, rx)
            .run(Vec::new())
            .unwrap();

        assert_eq!(outcome, ReviewOutcome::default());
    }
}
