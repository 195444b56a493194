//! Storage traits for product rows and run ledger entries.
//!
//! The traits are implemented by storage backends (e.g. `lapse-store-sqlite`).
//! The reconciliation engine and the run ledger depend on these abstractions,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  product::{ExistingEntry, ProductId, ProductRecord},
  run::{RunCounts, RunId, RunLedgerEntry, RunStatus},
};

/// Persistence for product rows.
///
/// Every write stamps `collected_at` with the store's clock and records the
/// run responsible for it. Each write is a single atomic statement; the store
/// never creates two rows with the same `(name, year)`.
pub trait ProductStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the row for `(name, year)`. Returns `None` if there is none.
  fn find_product<'a>(
    &'a self,
    name: &'a str,
    year: i32,
  ) -> impl Future<Output = Result<Option<ExistingEntry>, Self::Error>> + Send + 'a;

  /// Insert a new row for `record`, attributed to `run_id`.
  ///
  /// Returns an error if a row with the same key already exists.
  fn insert_product<'a>(
    &'a self,
    record: &'a ProductRecord,
    run_id: RunId,
  ) -> impl Future<Output = Result<ExistingEntry, Self::Error>> + Send + 'a;

  /// Overwrite the label and URL of row `id` with those of `record`,
  /// re-attributing it to `run_id`. The identifier is preserved.
  fn update_product<'a>(
    &'a self,
    id: ProductId,
    record: &'a ProductRecord,
    run_id: RunId,
  ) -> impl Future<Output = Result<ExistingEntry, Self::Error>> + Send + 'a;

  /// List stored rows, optionally restricted to one year, ordered by id.
  fn list_products(
    &self,
    year: Option<i32>,
  ) -> impl Future<Output = Result<Vec<ExistingEntry>, Self::Error>> + Send + '_;
}

/// Persistence for run ledger entries.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an [`RunStatus::InProgress`] entry and return it.
  fn open_run(
    &self,
    started_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<RunLedgerEntry, Self::Error>> + Send + '_;

  /// Move an in-progress entry to its terminal `status`, recording `counts`
  /// and `message`.
  ///
  /// Returns an error, leaving the entry untouched, if the entry does not
  /// exist or is no longer in progress.
  fn close_run<'a>(
    &'a self,
    run_id: RunId,
    status: RunStatus,
    counts: RunCounts,
    message: &'a str,
  ) -> impl Future<Output = Result<RunLedgerEntry, Self::Error>> + Send + 'a;

  /// Retrieve an entry by id. Returns `None` if not found.
  fn get_run(
    &self,
    run_id: RunId,
  ) -> impl Future<Output = Result<Option<RunLedgerEntry>, Self::Error>> + Send + '_;
}
