//! In-memory store used by the unit tests of this crate.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};

use crate::{
  product::{ExistingEntry, ProductId, ProductRecord},
  run::{RunCounts, RunId, RunLedgerEntry, RunStatus},
  store::{LedgerStore, ProductStore},
};

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("duplicate product ({0}, {1})")]
  Duplicate(String, i32),
  #[error("product {0} not found")]
  ProductNotFound(ProductId),
  #[error("injected write failure for {0:?}")]
  Injected(String),
  #[error("run {0} is not open")]
  RunNotOpen(RunId),
}

#[derive(Debug, Default)]
struct Inner {
  products:    Vec<ExistingEntry>,
  runs:        Vec<RunLedgerEntry>,
  fail_writes: HashSet<String>,
}

/// A shared, clonable store holding everything in a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  /// Make every insert or update of a product called `name` fail.
  pub fn fail_writes_for(&self, name: &str) {
    self.inner.lock().unwrap().fail_writes.insert(name.to_owned());
  }

  pub fn snapshot(&self) -> Vec<ExistingEntry> {
    self.inner.lock().unwrap().products.clone()
  }
}

impl Inner {
  fn check_injected(&self, name: &str) -> Result<(), MemoryError> {
    if self.fail_writes.contains(name) {
      return Err(MemoryError::Injected(name.to_owned()));
    }
    Ok(())
  }
}

impl ProductStore for MemoryStore {
  type Error = MemoryError;

  async fn find_product(
    &self,
    name: &str,
    year: i32,
  ) -> Result<Option<ExistingEntry>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .products
        .iter()
        .find(|e| e.name == name && e.year == year)
        .cloned(),
    )
  }

  async fn insert_product(
    &self,
    record: &ProductRecord,
    run_id: RunId,
  ) -> Result<ExistingEntry, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    inner.check_injected(&record.name)?;
    if inner
      .products
      .iter()
      .any(|e| e.name == record.name && e.year == record.year)
    {
      return Err(MemoryError::Duplicate(record.name.clone(), record.year));
    }

    let entry = ExistingEntry {
      product_id:        ProductId(inner.products.len() as i64 + 1),
      name:              record.name.clone(),
      year:              record.year,
      support_end_label: record.support_end_label.clone(),
      product_url:       record.product_url.clone(),
      collected_at:      Utc::now(),
      run_id:            Some(run_id),
    };
    inner.products.push(entry.clone());
    Ok(entry)
  }

  async fn update_product(
    &self,
    id: ProductId,
    record: &ProductRecord,
    run_id: RunId,
  ) -> Result<ExistingEntry, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    inner.check_injected(&record.name)?;
    let entry = inner
      .products
      .iter_mut()
      .find(|e| e.product_id == id)
      .ok_or(MemoryError::ProductNotFound(id))?;

    entry.support_end_label = record.support_end_label.clone();
    entry.product_url = record.product_url.clone();
    entry.collected_at = Utc::now();
    entry.run_id = Some(run_id);
    Ok(entry.clone())
  }

  async fn list_products(&self, year: Option<i32>) -> Result<Vec<ExistingEntry>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .products
        .iter()
        .filter(|e| year.is_none_or(|y| e.year == y))
        .cloned()
        .collect(),
    )
  }
}

impl LedgerStore for MemoryStore {
  type Error = MemoryError;

  async fn open_run(&self, started_at: DateTime<Utc>) -> Result<RunLedgerEntry, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    let entry = RunLedgerEntry {
      run_id: RunId(inner.runs.len() as i64 + 1),
      started_at,
      finished_at: None,
      status: RunStatus::InProgress,
      counts: RunCounts::default(),
      message: String::new(),
    };
    inner.runs.push(entry.clone());
    Ok(entry)
  }

  async fn close_run(
    &self,
    run_id: RunId,
    status: RunStatus,
    counts: RunCounts,
    message: &str,
  ) -> Result<RunLedgerEntry, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    let entry = inner
      .runs
      .iter_mut()
      .find(|r| r.run_id == run_id && r.status == RunStatus::InProgress)
      .ok_or(MemoryError::RunNotOpen(run_id))?;

    entry.status = status;
    entry.counts = counts;
    entry.message = message.to_owned();
    entry.finished_at = Some(Utc::now());
    Ok(entry.clone())
  }

  async fn get_run(&self, run_id: RunId) -> Result<Option<RunLedgerEntry>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.runs.iter().find(|r| r.run_id == run_id).cloned())
  }
}
