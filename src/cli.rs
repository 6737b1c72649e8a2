//! Command-line interface definitions for dupereview.
//!
//! # Example
//!
//! ```bash
//! # Review files in ~/Import that already exist somewhere under ~/Photos
//! dupereview --source ~/Import --dest ~/Photos
//!
//! # List the groups as JSON without reviewing
//! dupereview -s ~/Import -d ~/Photos --output json
//!
//! # Keep a record of the decisions
//! dupereview -s ~/Import -d ~/Photos --save-decisions decisions.json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Review same-named files between two directory trees.
///
/// Every file under the source tree whose name also appears under the
/// destination tree is shown next to each destination copy. Pressing `r`
/// marks the source copy for removal; nothing is deleted.
#[derive(Debug, Parser)]
#[command(name = "dupereview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tree holding the candidate copies
    #[arg(short, long, value_name = "DIR")]
    pub source: PathBuf,

    /// Tree holding the copies to keep
    #[arg(short, long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Output format (tui to review, json/csv to list the groups and exit)
    #[arg(short, long, value_enum, default_value = "tui")]
    pub output: OutputFormat,

    /// Write the review decisions to this JSON file
    #[arg(long, value_name = "PATH")]
    pub save_decisions: Option<PathBuf>,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links while walking
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links (overrides config)
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Include hidden files and directories (starting with .)
    #[arg(long, overrides_with = "no_include_hidden")]
    pub include_hidden: bool,

    /// Skip hidden files and directories (overrides config)
    #[arg(long, overrides_with = "include_hidden")]
    pub no_include_hidden: bool,

    /// Color theme for the review screen
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Video playback frame rate
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: Option<u32>,

    /// ASCII borders and textual markers instead of color-only cues
    #[arg(long)]
    pub accessible: bool,
}

impl Cli {
    /// `Some(value)` when a symlink flag was given.
    #[must_use]
    pub fn follow_symlinks_override(&self) -> Option<bool> {
        flag_override(self.follow_symlinks, self.no_follow_symlinks)
    }

    /// `Some(value)` when a hidden-files flag was given.
    #[must_use]
    pub fn include_hidden_override(&self) -> Option<bool> {
        flag_override(self.include_hidden, self.no_include_hidden)
    }
}

fn flag_override(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Interactive side-by-side review
    Tui,
    /// JSON listing of the groups
    Json,
    /// CSV listing, one row per pair
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tui => write!(f, "tui"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeArg {
    /// Pick from the terminal background
    #[default]
    Auto,
    /// Light text on a dark background
    Dark,
    /// Dark text on a light background
    Light,
}
