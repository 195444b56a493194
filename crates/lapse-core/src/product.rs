//! Product records: what the source page says, and what the store remembers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::run::RunId;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Store-assigned identifier of a persisted product row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── ProductRecord ───────────────────────────────────────────────────────────

/// One product row scraped from a year page, after normalization.
///
/// Identity is `(name, year)`. Values are never mutated once produced; build
/// them through [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
  pub name:              String,
  pub year:              i32,
  /// The support-end text exactly as the page shows it, trimmed
  /// (e.g. `"10/10/2025"`). Never parsed as a date.
  pub support_end_label: String,
  pub product_url:       Option<String>,
}

// ─── ExistingEntry ───────────────────────────────────────────────────────────

/// The persisted counterpart of a [`ProductRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingEntry {
  pub product_id:        ProductId,
  pub name:              String,
  pub year:              i32,
  pub support_end_label: String,
  pub product_url:       Option<String>,
  /// Set by the store on insert and on every update.
  pub collected_at:      DateTime<Utc>,
  /// The run that last inserted or updated this row.
  pub run_id:            Option<RunId>,
}

// ─── YearFetchResult ─────────────────────────────────────────────────────────

/// What fetching one year page produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFetchResult {
  pub year:       i32,
  pub source_url: String,
  pub outcome:    FetchOutcome,
}

/// Either the records of a page or the reason the page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
  Fetched {
    /// Text of the page's first `h1`, if it has one.
    title:   Option<String>,
    records: Vec<ProductRecord>,
  },
  Failed {
    error: String,
  },
}

impl YearFetchResult {
  pub fn fetched(
    year: i32,
    source_url: impl Into<String>,
    title: Option<String>,
    records: Vec<ProductRecord>,
  ) -> Self {
    Self {
      year,
      source_url: source_url.into(),
      outcome: FetchOutcome::Fetched { title, records },
    }
  }

  pub fn failed(
    year: i32,
    source_url: impl Into<String>,
    error: impl Into<String>,
  ) -> Self {
    Self {
      year,
      source_url: source_url.into(),
      outcome: FetchOutcome::Failed { error: error.into() },
    }
  }

  /// The page's records; empty for a failed fetch.
  pub fn records(&self) -> &[ProductRecord] {
    match &self.outcome {
      FetchOutcome::Fetched { records, .. } => records,
      FetchOutcome::Failed { .. } => &[],
    }
  }

  pub fn error(&self) -> Option<&str> {
    match &self.outcome {
      FetchOutcome::Fetched { .. } => None,
      FetchOutcome::Failed { error } => Some(error),
    }
  }

  pub fn is_failed(&self) -> bool { self.error().is_some() }
}
