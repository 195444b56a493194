//! The run ledger: one audit entry per run, opened before reconciliation and
//! closed exactly once afterwards.
//!
//! ```text
//! IN_PROGRESS ──▶ SUCCESS | SUCCESS_WITH_ERRORS | FAILED
//! ```

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  run::{RunEnd, RunId, RunLedgerEntry},
  store::LedgerStore,
};

/// Drives ledger entries through their lifecycle on a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct RunLedger<S> {
  store: S,
}

impl<S: LedgerStore> RunLedger<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Open an in-progress entry. Nothing may be reconciled until this
  /// succeeds.
  pub async fn begin(&self, started_at: DateTime<Utc>) -> Result<RunId> {
    let entry = self
      .store
      .open_run(started_at)
      .await
      .map_err(|e| Error::LedgerBegin(Box::new(e)))?;

    tracing::info!(run_id = %entry.run_id, "opened run ledger entry");
    Ok(entry.run_id)
  }

  /// Close the entry with the terminal status derived from `end`.
  ///
  /// A second call for the same run is rejected by the store and leaves the
  /// first terminal state in place.
  pub async fn finalize(&self, run_id: RunId, end: &RunEnd) -> Result<RunLedgerEntry> {
    let status  = end.status();
    let message = end.message();

    let entry = self
      .store
      .close_run(run_id, status, end.counts(), &message)
      .await
      .map_err(|e| Error::LedgerFinalize { run_id, source: Box::new(e) })?;

    tracing::info!(%run_id, %status, "{message}");
    Ok(entry)
  }
}
