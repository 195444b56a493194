//! Error type for `lapse-fetch`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Http(#[from] reqwest::Error),

  #[error("invalid css selector {selector:?}: {reason}")]
  Selector { selector: &'static str, reason: String },

  #[error("invalid base url")]
  BaseUrl(#[from] url::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
