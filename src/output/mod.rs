//! Output formatters.
//!
//! - [`json`]: JSON listing of the scan groups
//! - [`csv`]: CSV listing, one row per pair
//! - [`report`]: the decision report written after a review
//!
//! # Example
//!
//! ```no_run
//! use dupereview::duplicates::{DuplicateFinder, DuplicateGroup};
//! use dupereview::error::ExitCode;
//! use dupereview::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let mut scan = finder.scan(Path::new("import"), Path::new("photos")).unwrap();
//! let groups: Vec<DuplicateGroup> = scan.by_ref().collect();
//!
//! let output = JsonOutput::new(&groups, scan.stats(), false, ExitCode::Success);
//! output.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod report;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use report::DecisionReport;
