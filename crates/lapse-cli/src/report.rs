//! Human-readable text shown before and after a run.

use std::fmt::Write as _;

use lapse_core::{
  product::{FetchOutcome, YearFetchResult},
  run::{RunLedgerEntry, RunOutcome},
};
use serde::Serialize;

/// How many products of each year the preview lists by name.
const PREVIEW_EXAMPLES: usize = 3;
/// Longest product name shown in the preview, in characters.
const PREVIEW_NAME_CHARS: usize = 60;

/// Describe a fetched batch before it is reconciled.
pub fn preview(batch: &[YearFetchResult]) -> String {
  let mut out = String::new();

  for result in batch {
    let _ = writeln!(out, "{} ({})", result.year, result.source_url);
    match &result.outcome {
      FetchOutcome::Failed { error } => {
        let _ = writeln!(out, "  fetch failed: {error}");
      }
      FetchOutcome::Fetched { title, records } => {
        if let Some(title) = title {
          let _ = writeln!(out, "  {title}");
        }
        let _ = writeln!(out, "  {} products", records.len());
        for record in records.iter().take(PREVIEW_EXAMPLES) {
          let name: String = record.name.chars().take(PREVIEW_NAME_CHARS).collect();
          let _ = writeln!(out, "    {name} | {}", record.support_end_label);
        }
        if records.len() > PREVIEW_EXAMPLES {
          let _ = writeln!(out, "    ... and {} more", records.len() - PREVIEW_EXAMPLES);
        }
      }
    }
  }

  out
}

/// Describe a finished run: ledger status, per-year tallies, and totals.
pub fn summary(
  entry: &RunLedgerEntry,
  outcome: &RunOutcome,
  batch: &[YearFetchResult],
) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Run {} finished: {}", entry.run_id, entry.status);

  for result in batch {
    if let Some(error) = result.error() {
      let _ = writeln!(out, "  {}  fetch failed: {error}", result.year);
      continue;
    }
    if let Some(tally) = outcome.years.iter().find(|t| t.year == result.year) {
      let c = &tally.counts;
      let _ = writeln!(
        out,
        "  {}  inserted {}  updated {}  unchanged {}  errors {}",
        tally.year, c.inserted, c.updated, c.unchanged, c.errors
      );
    }
  }

  let _ = writeln!(out, "Totals: {}", outcome.summary());
  out
}

/// The `--json` form of a finished run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
  pub run:     &'a RunLedgerEntry,
  pub outcome: &'a RunOutcome,
}
