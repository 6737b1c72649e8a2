//! Decision report written after a review session.
//!
//! The report lists the source files the operator marked for removal. It is
//! an export only: nothing reads it back and nothing is deleted.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::json::JsonOutputError;
use crate::duplicates::ScanStats;
use crate::review::ReviewOutcome;

/// Everything written to `--save-decisions`.
#[derive(Debug, Serialize)]
pub struct DecisionReport<'a> {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Source tree root
    pub source_root: &'a Path,
    /// Destination tree root
    pub dest_root: &'a Path,
    /// Scan counters
    pub scan: ScanStats,
    /// Distinct source paths marked for removal
    pub remove: Vec<&'a PathBuf>,
    /// Full session outcome
    pub outcome: &'a ReviewOutcome,
}

impl<'a> DecisionReport<'a> {
    /// Build a report for a finished session.
    #[must_use]
    pub fn new(
        source_root: &'a Path,
        dest_root: &'a Path,
        scan: ScanStats,
        outcome: &'a ReviewOutcome,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            source_root,
            dest_root,
            scan,
            remove: outcome.removal_paths(),
            outcome,
        }
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Create or truncate `path` and write the report to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<(), JsonOutputError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!("Decisions written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::RemovalRecord;
    use crate::scanner::MediaKind;
    use tempfile::TempDir;

    fn removal(source: &str, dest: &str) -> RemovalRecord {
        RemovalRecord {
            basename: "dup.HEIC".to_string(),
            source: PathBuf::from(source),
            destination: PathBuf::from(dest),
            kind: MediaKind::Image,
            decided_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_lists_distinct_removals() {
        let outcome = ReviewOutcome {
            removals: vec![
                removal("/s/dup.HEIC", "/d/x/dup.HEIC"),
                removal("/s/dup.HEIC", "/d/y/dup.HEIC"),
            ],
            continued: 1,
            aborted: true,
            ..ReviewOutcome::default()
        };
        let report = DecisionReport::new(
            Path::new("/s"),
            Path::new("/d"),
            ScanStats::default(),
            &outcome,
        );

        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["remove"], serde_json::json!(["/s/dup.HEIC"]));
        assert_eq!(value["outcome"]["removals"].as_array().unwrap().len(), 2);
        assert_eq!(value["outcome"]["removals"][1]["destination"], "/d/y/dup.HEIC");
        assert_eq!(value["outcome"]["aborted"], true);
        assert_eq!(value["source_root"], "/s");
    }

    #[test]
    fn test_save_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("decisions.json");
        let outcome = ReviewOutcome::default();

        DecisionReport::new(dir.path(), dir.path(), ScanStats::default(), &outcome)
            .save(&path)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"remove\": []"));
    }

    #[test]
    fn test_save_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let outcome = ReviewOutcome::default();
        let report = DecisionReport::new(dir.path(), dir.path(), ScanStats::default(), &outcome);
        assert!(report.save(&dir.path().join("missing/decisions.json")).is_err());
    }
}
