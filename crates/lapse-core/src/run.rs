//! Run-level types: ledger entries, statuses, and reconciliation outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── RunId ───────────────────────────────────────────────────────────────────

/// Store-assigned, monotonically increasing identifier of a run.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RunId(pub i64);

impl fmt::Display for RunId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── RunStatus ───────────────────────────────────────────────────────────────

/// Lifecycle of a ledger entry.
///
/// `InProgress` is the only non-terminal state; every other state is final.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
  InProgress,
  Success,
  SuccessWithErrors,
  Failed,
}

impl RunStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::InProgress) }
}

// ─── Disposition ─────────────────────────────────────────────────────────────

/// What reconciliation did with one candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
  Insert,
  Update,
  Unchanged,
  Error,
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Per-category counters, shared by year tallies, outcomes, and ledger rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
  pub inserted:     u32,
  pub updated:      u32,
  pub unchanged:    u32,
  pub errors:       u32,
  /// Years whose page could not be fetched. Always zero in a year tally.
  pub fetch_failed: u32,
}

impl RunCounts {
  pub fn record(&mut self, disposition: Disposition) {
    match disposition {
      Disposition::Insert => self.inserted += 1,
      Disposition::Update => self.updated += 1,
      Disposition::Unchanged => self.unchanged += 1,
      Disposition::Error => self.errors += 1,
    }
  }

  /// Number of records that received a disposition.
  pub fn considered(&self) -> u32 {
    self.inserted + self.updated + self.unchanged + self.errors
  }
}

/// Dispositions for one successfully fetched year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTally {
  pub year:   i32,
  pub counts: RunCounts,
}

// ─── RunOutcome ──────────────────────────────────────────────────────────────

/// Aggregate result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
  pub counts:             RunCounts,
  /// Years skipped because their page could not be fetched, in input order.
  pub fetch_failed_years: Vec<i32>,
  /// One tally per fetched year, in input order.
  pub years:              Vec<YearTally>,
}

impl RunOutcome {
  pub fn inserted(&self) -> u32 { self.counts.inserted }

  pub fn updated(&self) -> u32 { self.counts.updated }

  pub fn unchanged(&self) -> u32 { self.counts.unchanged }

  pub fn errors(&self) -> u32 { self.counts.errors }

  /// Terminal status for a reconciliation that ran to completion.
  pub fn status(&self) -> RunStatus {
    if self.counts.errors == 0 && self.fetch_failed_years.is_empty() {
      RunStatus::Success
    } else {
      RunStatus::SuccessWithErrors
    }
  }

  /// Human-readable one-liner stored as the ledger message.
  pub fn summary(&self) -> String {
    let c = &self.counts;
    let mut msg = format!(
      "processed {} years: {} inserted, {} updated, {} unchanged, {} errors",
      self.years.len() + self.fetch_failed_years.len(),
      c.inserted,
      c.updated,
      c.unchanged,
      c.errors,
    );
    if !self.fetch_failed_years.is_empty() {
      let years: Vec<String> =
        self.fetch_failed_years.iter().map(i32::to_string).collect();
      msg.push_str(&format!("; fetch failed for years {}", years.join(", ")));
    }
    msg
  }
}

// ─── RunEnd ──────────────────────────────────────────────────────────────────

/// How a run ended, as handed to [`crate::ledger::RunLedger::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
  /// Reconciliation ran over the whole batch.
  Completed(RunOutcome),
  /// Reconciliation itself faulted; the string describes the fault.
  Faulted(String),
}

impl RunEnd {
  pub fn status(&self) -> RunStatus {
    match self {
      Self::Completed(outcome) => outcome.status(),
      Self::Faulted(_) => RunStatus::Failed,
    }
  }

  pub fn counts(&self) -> RunCounts {
    match self {
      Self::Completed(outcome) => RunCounts {
        fetch_failed: outcome.fetch_failed_years.len() as u32,
        ..outcome.counts
      },
      Self::Faulted(_) => RunCounts::default(),
    }
  }

  pub fn message(&self) -> String {
    match self {
      Self::Completed(outcome) => outcome.summary(),
      Self::Faulted(fault) => format!("reconciliation failed: {fault}"),
    }
  }
}

// ─── RunLedgerEntry ──────────────────────────────────────────────────────────

/// One audit row per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLedgerEntry {
  pub run_id:      RunId,
  pub started_at:  DateTime<Utc>,
  /// `None` while the run is in progress.
  pub finished_at: Option<DateTime<Utc>>,
  pub status:      RunStatus,
  pub counts:      RunCounts,
  pub message:     String,
}
