//! Error type for `lapse-store-sqlite`.

use std::path::PathBuf;

use lapse_core::{product::ProductId, run::RunId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database file could not be opened or its schema provisioned.
  #[error("could not open store at {path:?}")]
  Open {
    path:   PathBuf,
    #[source]
    source: tokio_rusqlite::Error,
  },

  #[error(transparent)]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE, CHECK, or FOREIGN KEY constraint rejected a write.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown run status: {0:?}")]
  UnknownStatus(String),

  #[error("product not found: {0}")]
  ProductNotFound(ProductId),

  #[error("run not found: {0}")]
  RunNotFound(RunId),

  /// Attempted to finalize a run that already reached a terminal status.
  #[error("run {0} is not in progress")]
  RunNotOpen(RunId),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      failure,
      message,
    )) = &e
      && failure.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Error::Constraint(
        message.clone().unwrap_or_else(|| failure.to_string()),
      );
    }
    Error::Database(e)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
