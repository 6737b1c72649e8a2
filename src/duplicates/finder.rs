//! Duplicate finder: name matching between a source and a destination tree.
//!
//! # Pipeline
//!
//! 1. **Validate** - both roots must exist, be directories and be readable
//! 2. **Index** - the destination tree is walked in full into a
//!    [`DestinationIndex`]
//! 3. **Match** - the source tree is walked lazily; each source file whose
//!    basename is in the index becomes a [`DuplicateGroup`]
//!
//! Step 3 happens inside [`DuplicateScan`], an iterator, so the review loop
//! can start on the first group while the rest of the source tree is still
//! unvisited.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::groups::{DestinationIndex, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration, applied to both trees.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, notified while the destination is indexed.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn walker(&self, root: &Path) -> Walker {
        let walker = Walker::new(root, self.walker_config.clone());
        match self.shutdown_flag {
            Some(ref flag) => walker.with_shutdown_flag(Arc::clone(flag)),
            None => walker,
        }
    }
}

/// Counters describing a scan, updated while [`DuplicateScan`] is iterated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanStats {
    /// Source files visited so far
    pub source_files: usize,
    /// Destination files in the index
    pub dest_files: usize,
    /// Groups yielded so far
    pub groups: usize,
    /// Destination matches across all yielded groups
    pub matches: usize,
    /// Per-entry walk errors in either tree
    pub walk_errors: usize,
}

/// Errors that abort a scan before any group is produced.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A root directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// A root path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A root directory exists but cannot be listed.
    #[error("Cannot read directory {path}: {source}")]
    Unreadable {
        /// The root that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Shutdown was requested before the destination index was complete.
    #[error("Scan interrupted by user")]
    Interrupted,
}

impl FinderError {
    /// The root path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryNotFound(p) | Self::NotADirectory(p) => Some(p),
            Self::Unreadable { path, .. } => Some(path),
            Self::Interrupted => None,
        }
    }
}

/// Orchestrates validation, indexing and lazy matching.
///
/// # Example
///
/// ```no_run
/// use dupereview::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// let scan = finder.scan(Path::new("/import"), Path::new("/library")).unwrap();
/// for group in scan {
///     println!("{}: {} match(es)", group.display_name(), group.len());
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Validate both roots, index the destination tree and return a lazy
    /// iterator over the groups found in the source tree.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if either root is missing, not a directory or
    /// unreadable, or if shutdown is requested while the destination is
    /// being indexed. Nothing is yielded in that case.
    pub fn scan(&self, source: &Path, dest: &Path) -> Result<DuplicateScan, FinderError> {
        let source = validate_root(source)?;
        let dest = validate_root(dest)?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Matching {} against {}",
            source.display(),
            dest.display()
        );

        let mut stats = ScanStats::default();
        let index = self.index_destination(&dest, &mut stats)?;
        log::info!(
            "Indexed {} destination files ({} distinct names)",
            index.file_count(),
            index.name_count()
        );

        let source_walk = self.config.walker(&source).walk();
        Ok(DuplicateScan {
            index,
            source_walk: Box::new(source_walk),
            stats,
            shutdown_flag: self.config.shutdown_flag.clone(),
        })
    }

    fn index_destination(
        &self,
        dest: &Path,
        stats: &mut ScanStats,
    ) -> Result<DestinationIndex, FinderError> {
        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start("indexing", 0);
            callback.on_message(&format!("Indexing {}", dest.display()));
        }

        let mut index = DestinationIndex::new();
        for result in self.config.walker(dest).walk() {
            match result {
                Ok(file) => {
                    if let Some(callback) = callback {
                        callback.on_progress(index.file_count() + 1, &file.path.to_string_lossy());
                    }
                    index.insert(file);
                }
                Err(_) => stats.walk_errors += 1,
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("indexing");
        }

        // A partial index would silently drop matches
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        stats.dest_files = index.file_count();
        Ok(index)
    }
}

/// Check a root directory and return its canonical form.
fn validate_root(path: &Path) -> Result<PathBuf, FinderError> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FinderError::DirectoryNotFound(path.to_path_buf()),
        _ => FinderError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }

    let unreadable = |source| FinderError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    std::fs::read_dir(path).map_err(unreadable)?;
    std::fs::canonicalize(path).map_err(unreadable)
}

/// Lazy sequence of [`DuplicateGroup`]s in source discovery order.
pub struct DuplicateScan {
    index: DestinationIndex,
    source_walk: Box<dyn Iterator<Item = Result<FileEntry, ScanError>>>,
    stats: ScanStats,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DuplicateScan {
    /// Statistics gathered so far.
    #[must_use]
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// The destination index this scan matches against.
    #[must_use]
    pub fn index(&self) -> &DestinationIndex {
        &self.index
    }

    /// Destination files named `basename`.
    #[must_use]
    pub fn matches_for(&self, basename: &OsStr) -> Option<&[FileEntry]> {
        self.index.matches(basename)
    }

    /// Whether the source walk was cut short by a shutdown request.
    #[must_use]
    pub fn was_interrupted(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

impl fmt::Debug for DuplicateScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateScan")
            .field("index", &self.index)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Iterator for DuplicateScan {
    type Item = DuplicateGroup;

    fn next(&mut self) -> Option<DuplicateGroup> {
        for result in self.source_walk.by_ref() {
            let file = match result {
                Ok(file) => file,
                Err(_) => {
                    // Already logged by the walker
                    self.stats.walk_errors += 1;
                    continue;
                }
            };

            self.stats.source_files += 1;
            if let Some(group) = self.index.group_for(file) {
                self.stats.groups += 1;
                self.stats.matches += group.len();
                log::debug!(
                    "Match: {} ({} destination(s))",
                    group.source.path.display(),
                    group.len()
                );
                return Some(group);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::MediaKind;
    use std::fs::{self, File};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn trees() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn test_single_match_yields_one_group() {
        let (src, dst) = trees();
        touch(src.path(), "a/IMG_1.HEIC");
        touch(src.path(), "a/clip.MOV");
        touch(dst.path(), "b/IMG_1.HEIC");
        touch(dst.path(), "b/other.MOV");

        let finder = DuplicateFinder::with_defaults();
        let mut scan = finder.scan(src.path(), dst.path()).unwrap();
        let groups: Vec<_> = scan.by_ref().collect();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].display_name(), "IMG_1.HEIC");
        assert_eq!(groups[0].kind(), MediaKind::Image);
        assert_eq!(groups[0].len(), 1);

        let stats = scan.stats();
        assert_eq!(stats.source_files, 2);
        assert_eq!(stats.dest_files, 2);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.matches, 1);
    }

    #[test]
    fn test_multiple_destinations_in_discovery_order() {
        let (src, dst) = trees();
        touch(src.path(), "s/dup.HEIC");
        touch(dst.path(), "x/dup.HEIC");
        touch(dst.path(), "y/dup.HEIC");

        let finder = DuplicateFinder::with_defaults();
        let groups: Vec<_> = finder.scan(src.path(), dst.path()).unwrap().collect();

        assert_eq!(groups.len(), 1);
        let dests: Vec<_> = groups[0]
            .destinations
            .iter()
            .map(|d| d.path.parent().unwrap().file_name().unwrap().to_owned())
            .collect();
        assert_eq!(dests, vec!["x", "y"]);
    }

    #[test]
    fn test_paths_are_absolute() {
        let (src, dst) = trees();
        touch(src.path(), "clip.MOV");
        touch(dst.path(), "clip.MOV");

        let finder = DuplicateFinder::with_defaults();
        let group = finder.scan(src.path(), dst.path()).unwrap().next().unwrap();

        assert!(group.source.path.is_absolute());
        assert!(group.destinations[0].path.is_absolute());
    }

    #[test]
    fn test_missing_root_fails_before_yielding() {
        let dst = TempDir::new().unwrap();
        let missing = dst.path().join("nope");

        let finder = DuplicateFinder::with_defaults();
        let err = finder.scan(&missing, dst.path()).unwrap_err();
        assert!(matches!(err, FinderError::DirectoryNotFound(ref p) if p == &missing));
        assert_eq!(err.path(), Some(missing.as_path()));

        let err = finder.scan(dst.path(), &missing).unwrap_err();
        assert!(matches!(err, FinderError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let (src, dst) = trees();
        touch(dst.path(), "file.txt");

        let finder = DuplicateFinder::with_defaults();
        let err = finder
            .scan(src.path(), &dst.path().join("file.txt"))
            .unwrap_err();
        assert!(matches!(err, FinderError::NotADirectory(_)));
    }

    #[test]
    fn test_shutdown_before_scan_is_interrupted() {
        let (src, dst) = trees();
        let flag = Arc::new(AtomicBool::new(true));
        let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

        let err = finder.scan(src.path(), dst.path()).unwrap_err();
        assert!(matches!(err, FinderError::Interrupted));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_shutdown_during_matching_stops_iteration() {
        let (src, dst) = trees();
        for i in 0..5 {
            touch(src.path(), &format!("{i}.MOV"));
            touch(dst.path(), &format!("{i}.MOV"));
        }
        let flag = Arc::new(AtomicBool::new(false));
        let finder =
            DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(Arc::clone(&flag)));

        let mut scan = finder.scan(src.path(), dst.path()).unwrap();
        assert!(scan.next().is_some());
        flag.store(true, Ordering::SeqCst);

        assert!(scan.next().is_none());
        assert!(scan.was_interrupted());
    }

    #[test]
    fn test_empty_trees_yield_nothing() {
        let (src, dst) = trees();
        let finder = DuplicateFinder::with_defaults();
        let mut scan = finder.scan(src.path(), dst.path()).unwrap();

        assert!(scan.next().is_none());
        assert_eq!(scan.stats(), ScanStats::default());
        assert!(scan.index().is_empty());
    }

    #[test]
    fn test_other_kinds_are_matched_too() {
        let (src, dst) = trees();
        touch(src.path(), "notes.txt");
        touch(dst.path(), "deep/er/notes.txt");

        let finder = DuplicateFinder::with_defaults();
        let scan = finder.scan(src.path(), dst.path()).unwrap();
        assert!(scan.matches_for(OsStr::new("notes.txt")).is_some());

        let groups: Vec<_> = scan.collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind(), MediaKind::Other);
    }

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingCallback {
        fn on_phase_start(&self, phase: &str, _total: usize) {
            self.events.lock().unwrap().push(format!("start:{phase}"));
        }
        fn on_progress(&self, current: usize, _path: &str) {
            self.events.lock().unwrap().push(format!("item:{current}"));
        }
        fn on_phase_end(&self, phase: &str) {
            self.events.lock().unwrap().push(format!("end:{phase}"));
        }
    }

    #[test]
    fn test_progress_reported_while_indexing() {
        let (src, dst) = trees();
        touch(dst.path(), "a.HEIC");
        touch(dst.path(), "b.HEIC");

        let callback = Arc::new(RecordingCallback::default());
        let config = FinderConfig::default().with_progress_callback(callback.clone());
        let _scan = DuplicateFinder::new(config)
            .scan(src.path(), dst.path())
            .unwrap();

        let events = callback.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start:indexing", "item:1", "item:2", "end:indexing"]
        );
    }
}
