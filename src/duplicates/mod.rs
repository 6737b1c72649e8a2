//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Indexing the destination tree by basename
//! - Lazily matching source files against that index
//! - Duplicate group representation

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, DuplicateScan, FinderConfig, FinderError, ScanStats};
pub use groups::{DestinationIndex, DuplicateGroup};
