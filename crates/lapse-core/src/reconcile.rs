//! The reconciliation engine.
//!
//! Decides, for every scraped record, whether it is new, changed, or unchanged
//! relative to the store, applies the corresponding write, and tallies the
//! results. A failure on one record is logged and counted; it never aborts the
//! rest of the batch.

use crate::{
  product::{FetchOutcome, ProductRecord, YearFetchResult},
  run::{Disposition, RunCounts, RunId, RunOutcome, YearTally},
  store::ProductStore,
};

/// Reconciles batches of fetched years against a [`ProductStore`].
///
/// The engine assumes it is the only writer: the lookup and the subsequent
/// write are separate statements.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine<S> {
  store: S,
}

impl<S: ProductStore> ReconciliationEngine<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Reconcile every record of every successfully fetched year, in order.
  ///
  /// Failed years contribute only to [`RunOutcome::fetch_failed_years`].
  pub async fn reconcile(
    &self,
    run_id: RunId,
    batch: &[YearFetchResult],
  ) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for result in batch {
      let records = match &result.outcome {
        FetchOutcome::Failed { error } => {
          tracing::warn!(year = result.year, %error, "skipping year, fetch failed");
          outcome.fetch_failed_years.push(result.year);
          continue;
        }
        FetchOutcome::Fetched { records, .. } => records,
      };

      let mut tally = RunCounts::default();
      for record in records {
        let disposition = self.reconcile_record(run_id, record).await;
        tally.record(disposition);
        outcome.counts.record(disposition);
      }

      tracing::info!(
        year = result.year,
        inserted = tally.inserted,
        updated = tally.updated,
        unchanged = tally.unchanged,
        errors = tally.errors,
        "reconciled year"
      );
      outcome.years.push(YearTally { year: result.year, counts: tally });
    }

    outcome
  }

  /// Reconcile one record, converting a store failure into
  /// [`Disposition::Error`].
  pub async fn reconcile_record(
    &self,
    run_id: RunId,
    record: &ProductRecord,
  ) -> Disposition {
    match self.apply(run_id, record).await {
      Ok(disposition) => {
        tracing::debug!(
          name = %record.name,
          year = record.year,
          %disposition,
          "reconciled record"
        );
        disposition
      }
      Err(e) => {
        tracing::warn!(
          name = %record.name,
          year = record.year,
          error = %e,
          "failed to persist record"
        );
        Disposition::Error
      }
    }
  }

  async fn apply(
    &self,
    run_id: RunId,
    record: &ProductRecord,
  ) -> Result<Disposition, S::Error> {
    let existing = self.store.find_product(&record.name, record.year).await?;

    match existing {
      None => {
        self.store.insert_product(record, run_id).await?;
        Ok(Disposition::Insert)
      }
      Some(entry) if entry.support_end_label == record.support_end_label => {
        Ok(Disposition::Unchanged)
      }
      Some(entry) => {
        self
          .store
          .update_product(entry.product_id, record, run_id)
          .await?;
        Ok(Disposition::Update)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  fn record(name: &str, year: i32, label: &str) -> ProductRecord {
    ProductRecord {
      name:              name.into(),
      year,
      support_end_label: label.into(),
      product_url:       None,
    }
  }

  fn page(year: i32, records: Vec<ProductRecord>) -> YearFetchResult {
    YearFetchResult::fetched(year, format!("https://example.test/{year}"), None, records)
  }

  const RUN: RunId = RunId(1);

  #[tokio::test]
  async fn new_record_is_inserted() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    let batch = [page(2025, vec![record("Windows Server 2012", 2025, "10/10/2025")])];

    let outcome = engine.reconcile(RUN, &batch).await;

    assert_eq!(outcome.inserted(), 1);
    assert_eq!(outcome.counts.considered(), 1);
    let stored = engine.store().snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].support_end_label, "10/10/2025");
    assert_eq!(stored[0].run_id, Some(RUN));
  }

  #[tokio::test]
  async fn identical_label_is_unchanged_and_untouched() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    let batch = [page(2025, vec![record("Windows Server 2012", 2025, "10/10/2025")])];
    engine.reconcile(RUN, &batch).await;
    let before = engine.store().snapshot();

    let outcome = engine.reconcile(RunId(2), &batch).await;

    assert_eq!(outcome.unchanged(), 1);
    assert_eq!(outcome.inserted(), 0);
    assert_eq!(outcome.updated(), 0);
    let after = engine.store().snapshot();
    assert_eq!(after, before);
    assert_eq!(after[0].run_id, Some(RUN));
  }

  #[tokio::test]
  async fn changed_label_is_updated_in_place() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    engine
      .reconcile(RUN, &[page(2025, vec![record("Windows Server 2012", 2025, "10/10/2025")])])
      .await;
    let original_id = engine.store().snapshot()[0].product_id;

    let outcome = engine
      .reconcile(
        RunId(2),
        &[page(2025, vec![record("Windows Server 2012", 2025, "12/12/2025")])],
      )
      .await;

    assert_eq!(outcome.updated(), 1);
    let stored = engine.store().snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].product_id, original_id);
    assert_eq!(stored[0].support_end_label, "12/12/2025");
    assert_eq!(stored[0].run_id, Some(RunId(2)));
  }

  #[tokio::test]
  async fn formatting_only_difference_counts_as_update() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    engine
      .reconcile(RUN, &[page(2025, vec![record("Office 2016", 2025, "Oct 14, 2025")])])
      .await;

    let outcome = engine
      .reconcile(RunId(2), &[page(2025, vec![record("Office 2016", 2025, "Oct 14,2025")])])
      .await;

    assert_eq!(outcome.updated(), 1);
  }

  #[tokio::test]
  async fn failed_years_are_skipped_and_reported() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    let batch = [
      page(2026, vec![record("SQL Server 2016", 2026, "7/14/2026")]),
      YearFetchResult::failed(2027, "https://example.test/2027", "timeout"),
    ];

    let outcome = engine.reconcile(RUN, &batch).await;

    assert_eq!(outcome.fetch_failed_years, vec![2027]);
    assert_eq!(outcome.inserted(), 1);
    assert_eq!(outcome.errors(), 0);
    assert_eq!(outcome.years.len(), 1);
    assert_eq!(outcome.years[0].year, 2026);
  }

  #[tokio::test]
  async fn one_failing_record_does_not_abort_the_batch() {
    let store = MemoryStore::default();
    store.fail_writes_for("Broken Product");
    let engine = ReconciliationEngine::new(store);
    let batch = [page(
      2025,
      vec![
        record("Office 2016", 2025, "10/14/2025"),
        record("Broken Product", 2025, "10/14/2025"),
        record("Office 2019", 2025, "10/14/2025"),
      ],
    )];

    let outcome = engine.reconcile(RUN, &batch).await;

    assert_eq!(outcome.errors(), 1);
    assert_eq!(outcome.inserted(), 2);
    let names: Vec<_> = engine
      .store()
      .snapshot()
      .into_iter()
      .map(|e| e.name)
      .collect();
    assert_eq!(names, ["Office 2016", "Office 2019"]);
  }

  #[tokio::test]
  async fn dispositions_cover_every_record_per_year() {
    let store = MemoryStore::default();
    store.fail_writes_for("Broken Product");
    let engine = ReconciliationEngine::new(store);
    engine
      .reconcile(
        RUN,
        &[page(
          2025,
          vec![record("A", 2025, "1/1/2025"), record("B", 2025, "1/1/2025")],
        )],
      )
      .await;

    let batch = [
      page(
        2025,
        vec![
          record("A", 2025, "1/1/2025"),
          record("B", 2025, "2/2/2025"),
          record("C", 2025, "1/1/2025"),
          record("Broken Product", 2025, "1/1/2025"),
        ],
      ),
      page(2026, vec![record("D", 2026, "1/1/2026")]),
      YearFetchResult::failed(2027, "https://example.test/2027", "HTTP 503"),
    ];
    let outcome = engine.reconcile(RunId(2), &batch).await;

    for (tally, input) in outcome.years.iter().zip(&batch) {
      assert_eq!(tally.year, input.year);
      assert_eq!(tally.counts.considered() as usize, input.records().len());
    }
    assert_eq!(outcome.counts.considered(), 5);
    assert_eq!(outcome.years[0].counts, RunCounts {
      inserted:     1,
      updated:      1,
      unchanged:    1,
      errors:       1,
      fetch_failed: 0,
    });
  }

  #[tokio::test]
  async fn duplicate_key_within_one_batch_never_duplicates_rows() {
    let engine = ReconciliationEngine::new(MemoryStore::default());
    let batch = [page(
      2025,
      vec![
        record("Visio 2016", 2025, "10/14/2025"),
        record("Visio 2016", 2025, "10/14/2025"),
      ],
    )];

    let outcome = engine.reconcile(RUN, &batch).await;

    assert_eq!(outcome.inserted(), 1);
    assert_eq!(outcome.unchanged(), 1);
    assert_eq!(engine.store().snapshot().len(), 1);
  }
}
