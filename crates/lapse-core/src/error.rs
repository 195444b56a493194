//! Error types for `lapse-core`.

use thiserror::Error;

use crate::run::RunId;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("product name is empty after normalization")]
  EmptyProductName,

  #[error("could not open a run ledger entry")]
  LedgerBegin(#[source] BoxError),

  #[error("could not finalize run {run_id}")]
  LedgerFinalize {
    run_id: RunId,
    #[source]
    source: BoxError,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
