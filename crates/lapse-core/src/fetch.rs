//! The fetcher boundary.

use std::future::Future;

use crate::product::YearFetchResult;

/// Supplies the candidate records of one year page.
///
/// Implementations never fail past this boundary: network errors, timeouts and
/// non-success statuses come back as [`YearFetchResult::failed`].
pub trait Fetcher: Send + Sync {
  /// The URL of the page listing products whose support ends in `year`.
  fn source_url(&self, year: i32) -> String;

  fn fetch_year(&self, year: i32) -> impl Future<Output = YearFetchResult> + Send + '_;
}
