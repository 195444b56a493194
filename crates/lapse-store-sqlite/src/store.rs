//! [`SqliteStore`], the SQLite implementation of [`ProductStore`] and
//! [`LedgerStore`].

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::{DateTime, Utc};
use lapse_core::{
  product::{ExistingEntry, ProductId, ProductRecord},
  run::{RunCounts, RunId, RunLedgerEntry, RunStatus},
  store::{LedgerStore, ProductStore},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{PRODUCT_COLUMNS, RUN_COLUMNS, RawProduct, RawRun, encode_dt, encode_status},
  schema::SCHEMA,
};

// ─── Config ──────────────────────────────────────────────────────────────────

/// Connection parameters for [`SqliteStore::connect`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
  /// Path of the database file; created if missing.
  pub path:         PathBuf,
  /// How long a statement waits on a locked database before failing.
  pub busy_timeout: Duration,
}

impl StoreConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), busy_timeout: Duration::from_secs(5) }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lapse store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the store described by `config` and provision the
  /// schema.
  pub async fn connect(config: &StoreConfig) -> Result<Self> {
    let path = config.path.clone();
    let busy_timeout = config.busy_timeout;

    let conn = tokio_rusqlite::Connection::open(&path)
      .await
      .map_err(|source| Error::Open { path: path.clone(), source })?;
    let store = Self { conn };

    store
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        Ok(())
      })
      .await
      .map_err(|source| Error::Open { path: path.clone(), source })?;

    store
      .init_schema()
      .await
      .map_err(|source| Error::Open { path: path.clone(), source })?;

    tracing::debug!(?path, "opened store");
    Ok(store)
  }

  /// Open a store at `path` with default settings.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::connect(&StoreConfig::new(path.as_ref())).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> tokio_rusqlite::Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }
}

// ─── ProductStore impl ───────────────────────────────────────────────────────

impl ProductStore for SqliteStore {
  type Error = Error;

  async fn find_product(&self, name: &str, year: i32) -> Result<Option<ExistingEntry>> {
    let name = name.to_owned();

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 WHERE product_name = ?1 AND year = ?2"
              ),
              rusqlite::params![name, year],
              RawProduct::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProduct::into_entry).transpose()
  }

  async fn insert_product(
    &self,
    record: &ProductRecord,
    run_id: RunId,
  ) -> Result<ExistingEntry> {
    let collected_at = Utc::now();

    let name   = record.name.clone();
    let year   = record.year;
    let label  = record.support_end_label.clone();
    let url    = record.product_url.clone();
    let at_str = encode_dt(collected_at);

    let product_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products
             (year, product_name, support_end, product_url, run_id, collected_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![year, name, label, url, run_id.0, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ExistingEntry {
      product_id: ProductId(product_id),
      name: record.name.clone(),
      year: record.year,
      support_end_label: record.support_end_label.clone(),
      product_url: record.product_url.clone(),
      collected_at,
      run_id: Some(run_id),
    })
  }

  async fn update_product(
    &self,
    id: ProductId,
    record: &ProductRecord,
    run_id: RunId,
  ) -> Result<ExistingEntry> {
    let label  = record.support_end_label.clone();
    let url    = record.product_url.clone();
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE products
           SET support_end = ?2, product_url = ?3, run_id = ?4, collected_at = ?5
           WHERE product_id = ?1",
          rusqlite::params![id.0, label, url, run_id.0, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
          rusqlite::params![id.0],
          RawProduct::from_row,
        )?))
      })
      .await?;

    raw.ok_or(Error::ProductNotFound(id))?.into_entry()
  }

  async fn list_products(&self, year: Option<i32>) -> Result<Vec<ExistingEntry>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM products
           WHERE ?1 IS NULL OR year = ?1
           ORDER BY product_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![year], RawProduct::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_entry).collect()
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  async fn open_run(&self, started_at: DateTime<Utc>) -> Result<RunLedgerEntry> {
    let at_str = encode_dt(started_at);
    let status = encode_status(RunStatus::InProgress);

    let run_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO runs (started_at, status) VALUES (?1, ?2)",
          rusqlite::params![at_str, status],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(RunLedgerEntry {
      run_id: RunId(run_id),
      started_at,
      finished_at: None,
      status: RunStatus::InProgress,
      counts: RunCounts::default(),
      message: String::new(),
    })
  }

  async fn close_run(
    &self,
    run_id: RunId,
    status: RunStatus,
    counts: RunCounts,
    message: &str,
  ) -> Result<RunLedgerEntry> {
    let status_str  = encode_status(status);
    let open_status = encode_status(RunStatus::InProgress);
    let at_str      = encode_dt(Utc::now());
    let message     = message.to_owned();

    let (changed, raw): (usize, Option<RawRun>) = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE runs
           SET status = ?2, finished_at = ?3,
               inserted_count = ?4, updated_count = ?5, unchanged_count = ?6,
               error_count = ?7, fetch_failed_count = ?8, message = ?9
           WHERE run_id = ?1 AND status = ?10",
          rusqlite::params![
            run_id.0,
            status_str,
            at_str,
            counts.inserted,
            counts.updated,
            counts.unchanged,
            counts.errors,
            counts.fetch_failed,
            message,
            open_status,
          ],
        )?;
        let raw = conn
          .query_row(
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?1"),
            rusqlite::params![run_id.0],
            RawRun::from_row,
          )
          .optional()?;
        Ok((changed, raw))
      })
      .await?;

    match (changed, raw) {
      (_, None) => Err(Error::RunNotFound(run_id)),
      (0, Some(_)) => Err(Error::RunNotOpen(run_id)),
      (_, Some(raw)) => raw.into_entry(),
    }
  }

  async fn get_run(&self, run_id: RunId) -> Result<Option<RunLedgerEntry>> {
    let raw: Option<RawRun> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?1"),
              rusqlite::params![run_id.0],
              RawRun::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRun::into_entry).transpose()
  }
}
