//! Name-based grouping of source and destination files.
//!
//! # Overview
//!
//! The destination tree is enumerated in full into a [`DestinationIndex`]
//! keyed by basename. Each source file is then looked up in the index; a
//! hit produces a [`DuplicateGroup`] holding the source file and every
//! destination file with the same name, in destination discovery order.
//!
//! Names are compared as raw bytes: no case folding, no Unicode
//! normalization, no content or size comparison.
//!
//! # Example
//!
//! ```
//! use dupereview::scanner::FileEntry;
//! use dupereview::duplicates::DestinationIndex;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let now = SystemTime::now();
//! let index = DestinationIndex::from_entries(vec![
//!     FileEntry::new(PathBuf::from("/dest/x/dup.HEIC"), 10, now),
//!     FileEntry::new(PathBuf::from("/dest/y/dup.HEIC"), 10, now),
//!     FileEntry::new(PathBuf::from("/dest/other.MOV"), 10, now),
//! ]);
//!
//! let source = FileEntry::new(PathBuf::from("/src/s/dup.HEIC"), 10, now);
//! let group = index.group_for(source).unwrap();
//! assert_eq!(group.len(), 2);
//! ```

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use crate::scanner::{FileEntry, MediaKind};

/// One source file plus every destination file sharing its basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared final path segment
    pub basename: OsString,
    /// The source file (candidate for removal)
    pub source: FileEntry,
    /// Matching destination files, in discovery order
    pub destinations: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new group for `source` and its matches.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if a destination does not share the source's basename.
    #[must_use]
    pub fn new(source: FileEntry, destinations: Vec<FileEntry>) -> Self {
        debug_assert!(
            destinations.iter().all(|d| d.basename == source.basename),
            "destination basename differs from source {:?}",
            source.basename
        );
        Self {
            basename: source.basename.clone(),
            source,
            destinations,
        }
    }

    /// Media kind of the group, taken from the shared basename.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.source.kind
    }

    /// Number of destination matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Check if this group has no destination matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// The basename for display purposes.
    #[must_use]
    pub fn display_name(&self) -> std::borrow::Cow<'_, str> {
        self.basename.to_string_lossy()
    }

    /// Iterate the (source, destination) pairs in review order.
    pub fn pairs(&self) -> impl Iterator<Item = (&FileEntry, &FileEntry)> {
        self.destinations.iter().map(move |d| (&self.source, d))
    }
}

/// Index of every destination file, keyed by basename.
#[derive(Debug, Clone, Default)]
pub struct DestinationIndex {
    by_name: HashMap<OsString, Vec<FileEntry>>,
    file_count: usize,
}

impl DestinationIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from entries in discovery order.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = FileEntry>,
    {
        let mut index = Self::new();
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    /// Add a destination file. Later inserts sort after earlier ones.
    pub fn insert(&mut self, entry: FileEntry) {
        self.file_count += 1;
        self.by_name
            .entry(entry.basename.clone())
            .or_default()
            .push(entry);
    }

    /// Destination files named exactly `basename`.
    #[must_use]
    pub fn matches(&self, basename: &OsStr) -> Option<&[FileEntry]> {
        self.by_name.get(basename).map(Vec::as_slice)
    }

    /// Build the group for `source`, or `None` if nothing shares its name.
    #[must_use]
    pub fn group_for(&self, source: FileEntry) -> Option<DuplicateGroup> {
        let destinations = self.matches(&source.basename)?.to_vec();
        Some(DuplicateGroup::new(source, destinations))
    }

    /// Total number of indexed destination files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Number of distinct basenames in the index.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// Check if the index holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_count == 0
    }
}
