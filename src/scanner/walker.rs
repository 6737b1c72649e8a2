//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileEntry`] values for name matching.
//!
//! # Features
//!
//! - Children sorted by file name in every directory, so the walk order is
//!   deterministic for a given filesystem snapshot
//! - Configurable symlink following
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden file filtering
//! - Graceful shutdown via atomic flag
//!
//! Empty files are kept: a zero-byte `IMG_1.HEIC` still shares its name
//! with its counterpart.
//!
//! # Example
//!
//! ```no_run
//! use dupereview::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/Volumes/Backup/Photos"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for ordered file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build gitignore matcher from config patterns and .gitignore file.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration. The iterator
    /// owns everything it needs, so it can outlive the `Walker`.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
        let filter = EntryFilter {
            root: self.root.clone(),
            follow_symlinks: self.config.follow_symlinks,
            gitignore: self.build_gitignore(),
        };
        let shutdown_flag = self.shutdown_flag.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = shutdown_flag
                    .as_ref()
                    .is_some_and(|f| f.load(Ordering::SeqCst));
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => filter.process(entry.path(), entry.file_type()),
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| filter.root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            })
    }
}

/// Per-entry filtering state moved into the walk iterator.
struct EntryFilter {
    root: PathBuf,
    follow_symlinks: bool,
    gitignore: Option<Gitignore>,
}

impl EntryFilter {
    /// Turn a jwalk entry into a [`FileEntry`], or drop it.
    fn process(
        &self,
        path: PathBuf,
        file_type: std::fs::FileType,
    ) -> Option<Result<FileEntry, ScanError>> {
        if path == self.root || file_type.is_dir() {
            return None;
        }

        if self.should_ignore(&path) {
            log::trace!("Ignoring file: {}", path.display());
            return None;
        }

        if file_type.is_symlink() && !self.follow_symlinks {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        let metadata = if self.follow_symlinks {
            std::fs::metadata(&path)
        } else {
            std::fs::symlink_metadata(&path)
        };

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Some(Err(handle_io_error(&path, e))),
        };

        if !metadata.is_file() {
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(Ok(FileEntry::new(path, metadata.len(), modified)))
    }

    /// Check if a path, or any directory above it, matches an ignore pattern.
    fn should_ignore(&self, path: &Path) -> bool {
        let Some(gi) = &self.gitignore else {
            return false;
        };
        // The matcher asserts on paths outside its root
        let Ok(relative_path) = path.strip_prefix(&self.root) else {
            return false;
        };
        gi.matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }
}

/// Handle I/O errors during file access.
fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::debug!("File not found (may have been deleted): {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}
