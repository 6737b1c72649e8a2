//! Scanner module for directory traversal.
//!
//! This module provides functionality for:
//! - Sorted, streaming directory walking using jwalk
//! - Gitignore-style ignore patterns
//! - Media classification of every discovered file
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//!
//! Name matching between two trees lives in [`crate::duplicates`].
//!
//! # Example
//!
//! ```no_run
//! use dupereview::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} ({})", file.path.display(), file.kind),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod walker;

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use walker::Walker;

/// Suffix that marks a file as an image needing interactive review.
pub const IMAGE_SUFFIX: &str = ".HEIC";

/// Suffix that marks a file as a video needing interactive review.
pub const VIDEO_SUFFIX: &str = ".MOV";

/// Media classification of a scanned file.
///
/// Computed once from the file name when the entry is created. The suffix
/// comparison is byte-wise and case-sensitive: `photo.heic` is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (`.HEIC`)
    Image,
    /// Video clip (`.MOV`)
    Video,
    /// Anything else; matched by name but never previewed
    Other,
}

impl MediaKind {
    /// Classify a file by its final path segment.
    #[must_use]
    pub fn from_file_name(name: &OsStr) -> Self {
        let bytes = name.as_encoded_bytes();
        if bytes.ends_with(IMAGE_SUFFIX.as_bytes()) {
            Self::Image
        } else if bytes.ends_with(VIDEO_SUFFIX.as_bytes()) {
            Self::Video
        } else {
            Self::Other
        }
    }

    /// Whether pairs of this kind are shown to the operator.
    #[must_use]
    pub fn is_reviewable(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Metadata for a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Final path segment, compared byte for byte when matching
    pub basename: OsString,
    /// Media classification derived from `basename`
    pub kind: MediaKind,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileEntry {
    /// Create a new FileEntry, deriving `basename` and `kind` from `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let basename = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        let kind = MediaKind::from_file_name(&basename);
        Self {
            path,
            basename,
            kind,
            size,
            modified,
        }
    }

    /// The basename for display purposes.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        self.basename.to_string_lossy()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    /// These are applied in addition to any .gitignore file at the root.
    pub ignore_patterns: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: true,
            ignore_patterns: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// Errors that can occur for individual entries while walking a tree.
///
/// These never abort a walk; they are yielded alongside the entries.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
