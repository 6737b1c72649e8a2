//! CSV listing of the groups found by a scan.
//!
//! One row is generated for each (source, destination) pair.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number
//! - `name`: Shared basename
//! - `kind`: `image`, `video` or `other`
//! - `source`, `destination`: Absolute paths
//! - `source_size`, `destination_size`: Sizes in bytes
//! - `source_modified`, `destination_modified`: RFC 3339 timestamps

use std::io;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::MediaKind;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    group_id: usize,
    name: String,
    kind: MediaKind,
    source: String,
    destination: String,
    source_size: u64,
    destination_size: u64,
    source_modified: String,
    destination_modified: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the header and one row per pair.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            for (source, dest) in group.pairs() {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    name: group.display_name().into_owned(),
                    kind: group.kind(),
                    source: source.path.to_string_lossy().into_owned(),
                    destination: dest.path.to_string_lossy().into_owned(),
                    source_size: source.size,
                    destination_size: dest.size,
                    source_modified: format_time(source.modified),
                    destination_modified: format_time(dest.modified),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileEntry;
    use std::path::PathBuf;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_one_row_per_pair() {
        let groups = vec![
            DuplicateGroup::new(
                entry("/s/dup.HEIC", 10),
                vec![entry("/d/x/dup.HEIC", 10), entry("/d/y/dup.HEIC", 11)],
            ),
            DuplicateGroup::new(entry("/s/clip.MOV", 5), vec![entry("/d/clip.MOV", 5)]),
        ];

        let csv = CsvOutput::new(&groups).to_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "group_id,name,kind,source,destination,source_size,destination_size,source_modified,destination_modified"
        );
        assert!(lines[1].starts_with("1,dup.HEIC,image,/s/dup.HEIC,/d/x/dup.HEIC,10,10,1970-01-01T00:00:00"));
        assert!(lines[2].contains("/d/y/dup.HEIC,10,11"));
        assert!(lines[3].starts_with("2,clip.MOV,video,"));
    }

    #[test]
    fn test_empty_has_no_rows() {
        let csv = CsvOutput::new(&[]).to_string().unwrap();
        assert!(csv.is_empty());
    }
}
