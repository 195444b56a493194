//! Sequences one run: fetch every year, confirm, reconcile, close the ledger.

use std::{ops::Range, time::Duration};

use anyhow::{Context as _, anyhow};
use chrono::Utc;
use lapse_core::{
  fetch::Fetcher,
  ledger::RunLedger,
  product::YearFetchResult,
  reconcile::ReconciliationEngine,
  run::{RunEnd, RunLedgerEntry, RunOutcome},
  store::{LedgerStore, ProductStore},
};

use crate::confirm::Confirm;

/// What a run ended with, when it did not fail.
#[derive(Debug)]
pub enum RunReport {
  /// The gate refused the batch; nothing was written and no ledger entry
  /// exists.
  Declined { batch: Vec<YearFetchResult> },
  Finished {
    entry:   RunLedgerEntry,
    outcome: RunOutcome,
    batch:   Vec<YearFetchResult>,
  },
}

pub struct Orchestrator<F, S> {
  fetcher:       F,
  store:         S,
  years:         Range<i32>,
  request_delay: Duration,
}

impl<F, S> Orchestrator<F, S>
where
  F: Fetcher,
  S: ProductStore + LedgerStore + Clone + 'static,
{
  pub fn new(fetcher: F, store: S, years: Range<i32>, request_delay: Duration) -> Self {
    Self { fetcher, store, years, request_delay }
  }

  /// Fetch every configured year in order, pausing between requests.
  pub async fn collect(&self) -> Vec<YearFetchResult> {
    let mut batch = Vec::with_capacity(self.years.len());

    for (i, year) in self.years.clone().enumerate() {
      if i > 0 && !self.request_delay.is_zero() {
        tokio::time::sleep(self.request_delay).await;
      }
      batch.push(self.fetcher.fetch_year(year).await);
    }

    batch
  }

  /// Run end to end.
  ///
  /// Once the ledger entry is open it is always finalized: a panic during
  /// reconciliation closes it as `FAILED` and is returned as an error.
  pub async fn execute<G>(&self, mut gate: G) -> anyhow::Result<RunReport>
  where
    G: Confirm + Send + 'static,
  {
    let batch = self.collect().await;

    // The gate may block on terminal input.
    let (batch, confirmed) = tokio::task::spawn_blocking(move || {
      let confirmed = gate.confirm(&batch);
      (batch, confirmed)
    })
    .await
    .context("confirmation prompt panicked")?;

    if !confirmed.context("confirmation prompt failed")? {
      tracing::info!("batch declined, nothing written");
      return Ok(RunReport::Declined { batch });
    }

    let ledger = RunLedger::new(self.store.clone());
    let run_id = ledger.begin(Utc::now()).await?;

    let engine = ReconciliationEngine::new(self.store.clone());
    let task_batch = batch.clone();
    let joined =
      tokio::spawn(async move { engine.reconcile(run_id, &task_batch).await }).await;

    let end = match joined {
      Ok(outcome) => RunEnd::Completed(outcome),
      Err(e) => RunEnd::Faulted(describe_fault(e)),
    };

    let entry = match ledger.finalize(run_id, &end).await {
      Ok(entry) => entry,
      Err(e) => {
        let e = anyhow::Error::from(e);
        let detail = format!("{e:#}");
        tracing::error!(
          %run_id,
          error = %detail,
          "run ledger entry could not be finalized; changes made by this run are unaudited"
        );
        return Err(e);
      }
    };

    match end {
      RunEnd::Completed(outcome) => Ok(RunReport::Finished { entry, outcome, batch }),
      RunEnd::Faulted(fault) => Err(anyhow!("run {run_id} failed: {fault}")),
    }
  }
}

fn describe_fault(e: tokio::task::JoinError) -> String {
  if !e.is_panic() {
    return e.to_string();
  }
  let payload = e.into_panic();
  if let Some(s) = payload.downcast_ref::<&str>() {
    format!("panic: {s}")
  } else if let Some(s) = payload.downcast_ref::<String>() {
    format!("panic: {s}")
  } else {
    "panic".to_owned()
  }
}
