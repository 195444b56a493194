//! Retrieval of Microsoft end-of-support year pages.
//!
//! [`HttpFetcher`] downloads one page per year and hands the markup to
//! [`PageParser`], whose raw fragments are normalized into
//! [`lapse_core::product::ProductRecord`]s.

mod client;
mod parse;

pub mod error;

pub use client::{FetcherConfig, HttpFetcher};
pub use error::{Error, Result};
pub use parse::{PageParser, ParsedPage};
