//! dupereview - side-by-side review of same-named files
//!
//! Walks a source tree and a destination tree, pairs every source file with
//! each destination file of the same name, and lets an operator decide per
//! pair whether the source copy should go. `.HEIC` images and `.MOV` videos
//! are previewed in the terminal; decisions are recorded, never executed.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod media;
pub mod output;
pub mod progress;
pub mod review;
pub mod scanner;
pub mod signal;
pub mod tui;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use yansi::Paint;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig, ScanStats};
use crate::error::ExitCode;
use crate::output::{CsvOutput, DecisionReport, JsonOutput};
use crate::progress::Progress;
use crate::review::ReviewOutcome;

/// Run one scan, then list or review the groups.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Returns [`duplicates::FinderError`] (wrapped) when a root cannot be
/// scanned, and other errors for terminal or output failures. Use
/// [`ExitCode::for_error`] to map them.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler();
    let mut config = Config::load();
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let progress = Arc::new(Progress::new(cli.quiet).clear_on_finish(true));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_walker_config(config.walker_config())
            .with_shutdown_flag(handler.get_flag())
            .with_progress_callback(progress),
    );
    let mut scan = finder.scan(&cli.source, &cli.dest)?;

    match cli.output {
        OutputFormat::Json | OutputFormat::Csv => {
            let groups: Vec<DuplicateGroup> = scan.by_ref().collect();
            let interrupted = scan.was_interrupted();
            let exit_code = if interrupted {
                ExitCode::Interrupted
            } else {
                ExitCode::Success
            };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if cli.output == OutputFormat::Json {
                JsonOutput::new(&groups, scan.stats(), interrupted, exit_code)
                    .write_to(&mut out)
                    .context("failed to write JSON output")?;
            } else {
                CsvOutput::new(&groups)
                    .write_to(&mut out)
                    .context("failed to write CSV output")?;
            }
            Ok(exit_code)
        }
        OutputFormat::Tui => {
            let outcome = tui::run_review(scan.by_ref(), &config.review_options(), handler.get_flag())
                .context("review session failed")?;
            let stats = scan.stats();

            if let Some(path) = &cli.save_decisions {
                DecisionReport::new(&cli.source, &cli.dest, stats, &outcome)
                    .save(path)
                    .with_context(|| format!("failed to write decisions to {}", path.display()))?;
            }
            if !cli.quiet {
                print_summary(&mut io::stdout().lock(), &outcome, stats)?;
            }

            if outcome.aborted || handler.is_shutdown_requested() {
                Ok(ExitCode::Interrupted)
            } else {
                Ok(ExitCode::Success)
            }
        }
    }
}

/// Print the end-of-session summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_summary<W: Write>(
    out: &mut W,
    outcome: &ReviewOutcome,
    stats: ScanStats,
) -> io::Result<()> {
    writeln!(
        out,
        "{} {} pairs from {} groups",
        "Reviewed".bold(),
        outcome.pairs_seen(),
        stats.groups
    )?;
    writeln!(out, "  {} marked for removal", outcome.removals.len().red().bold())?;
    writeln!(out, "  {} kept", outcome.continued.green())?;
    if !outcome.undecided.is_empty() {
        writeln!(out, "  {} could not be previewed", outcome.undecided.len().yellow())?;
    }
    if outcome.skipped_other > 0 {
        writeln!(
            out,
            "  {} groups skipped (neither image nor video)",
            outcome.skipped_other.dim()
        )?;
    }
    if stats.walk_errors > 0 {
        writeln!(out, "  {} entries could not be read", stats.walk_errors.yellow())?;
    }

    let removals = outcome.removal_paths();
    if !removals.is_empty() {
        writeln!(out, "{}", "Marked for removal:".bold())?;
        for path in removals {
            writeln!(out, "  {}", path.display())?;
        }
    }
    for pair in &outcome.undecided {
        writeln!(
            out,
            "{} {}: {}",
            "Not previewed".yellow(),
            pair.source.display(),
            pair.reason
        )?;
    }
    if outcome.aborted {
        writeln!(out, "{}", "Review aborted; remaining groups were not shown.".yellow())?;
    }
    Ok(())
}
