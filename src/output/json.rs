//! JSON listing of the groups found by a scan.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "name": "IMG_0001.HEIC",
//!       "kind": "image",
//!       "source": { "path": "/import/IMG_0001.HEIC", "size": 2048 },
//!       "destinations": [
//!         { "path": "/photos/2023/IMG_0001.HEIC", "size": 2048 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "source_files": 10,
//!     "dest_files": 120,
//!     "groups": 1,
//!     "matches": 1,
//!     "walk_errors": 0,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DR000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanStats};
use crate::error::ExitCode;
use crate::scanner::{FileEntry, MediaKind};

/// One file in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

impl From<&FileEntry> for JsonFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.to_string_lossy().into_owned(),
            size: entry.size,
        }
    }
}

/// A group in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonGroup {
    /// Shared basename
    pub name: String,
    /// Media kind
    pub kind: MediaKind,
    /// The source file
    pub source: JsonFile,
    /// Destination files with the same name, in discovery order
    pub destinations: Vec<JsonFile>,
}

impl From<&DuplicateGroup> for JsonGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            name: group.display_name().into_owned(),
            kind: group.kind(),
            source: JsonFile::from(&group.source),
            destinations: group.destinations.iter().map(JsonFile::from).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Scan counters
    #[serde(flatten)]
    pub stats: ScanStats,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DR000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Groups in scan order
    pub groups: Vec<JsonGroup>,
    /// Scan summary
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the listing.
    ///
    /// ```
    /// use dupereview::duplicates::ScanStats;
    /// use dupereview::error::ExitCode;
    /// use dupereview::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], ScanStats::default(), false, ExitCode::Success);
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        stats: ScanStats,
        interrupted: bool,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            groups: groups.iter().map(JsonGroup::from).collect(),
            summary: JsonSummary {
                stats,
                interrupted,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
