//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; run statuses are their
//! `SCREAMING_SNAKE_CASE` names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use lapse_core::{
  product::{ExistingEntry, ProductId},
  run::{RunCounts, RunId, RunLedgerEntry, RunStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RunStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(status: RunStatus) -> &'static str { status.into() }

pub fn decode_status(s: &str) -> Result<RunStatus> {
  RunStatus::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const PRODUCT_COLUMNS: &str =
  "product_id, product_name, year, support_end, product_url, collected_at, run_id";

/// A `products` row exactly as read from SQLite.
pub struct RawProduct {
  pub product_id:   i64,
  pub product_name: String,
  pub year:         i32,
  pub support_end:  String,
  pub product_url:  Option<String>,
  pub collected_at: String,
  pub run_id:       Option<i64>,
}

impl RawProduct {
  /// Row mapper for queries selecting [`PRODUCT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:   row.get(0)?,
      product_name: row.get(1)?,
      year:         row.get(2)?,
      support_end:  row.get(3)?,
      product_url:  row.get(4)?,
      collected_at: row.get(5)?,
      run_id:       row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<ExistingEntry> {
    Ok(ExistingEntry {
      product_id:        ProductId(self.product_id),
      name:              self.product_name,
      year:              self.year,
      support_end_label: self.support_end,
      product_url:       self.product_url,
      collected_at:      decode_dt(&self.collected_at)?,
      run_id:            self.run_id.map(RunId),
    })
  }
}

pub const RUN_COLUMNS: &str = "run_id, started_at, finished_at, status, inserted_count, \
                               updated_count, unchanged_count, error_count, \
                               fetch_failed_count, message";

/// A `runs` row exactly as read from SQLite.
pub struct RawRun {
  pub run_id:       i64,
  pub started_at:   String,
  pub finished_at:  Option<String>,
  pub status:       String,
  pub inserted:     u32,
  pub updated:      u32,
  pub unchanged:    u32,
  pub errors:       u32,
  pub fetch_failed: u32,
  pub message:      String,
}

impl RawRun {
  /// Row mapper for queries selecting [`RUN_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:       row.get(0)?,
      started_at:   row.get(1)?,
      finished_at:  row.get(2)?,
      status:       row.get(3)?,
      inserted:     row.get(4)?,
      updated:      row.get(5)?,
      unchanged:    row.get(6)?,
      errors:       row.get(7)?,
      fetch_failed: row.get(8)?,
      message:      row.get(9)?,
    })
  }

  pub fn into_entry(self) -> Result<RunLedgerEntry> {
    Ok(RunLedgerEntry {
      run_id:      RunId(self.run_id),
      started_at:  decode_dt(&self.started_at)?,
      finished_at: self.finished_at.as_deref().map(decode_dt).transpose()?,
      status:      decode_status(&self.status)?,
      counts:      RunCounts {
        inserted:     self.inserted,
        updated:      self.updated,
        unchanged:    self.unchanged,
        errors:       self.errors,
        fetch_failed: self.fetch_failed,
      },
      message:     self.message,
    })
  }
}
