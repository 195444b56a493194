//! HTTP fetcher for the end-of-support year pages.

use std::time::Duration;

use lapse_core::{fetch::Fetcher, normalize::normalize_all, product::YearFetchResult};
use reqwest::{Client, header};
use url::Url;

use crate::{Result, parse::PageParser};

/// Connection settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
  /// Site origin; year pages and relative product links resolve against it.
  pub base_url:   Url,
  pub timeout:    Duration,
  pub user_agent: String,
}

impl FetcherConfig {
  pub const DEFAULT_BASE_URL: &'static str = "https://learn.microsoft.com";
  pub const DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

  pub fn new(base_url: &str) -> Result<Self> {
    Ok(Self {
      base_url:   Url::parse(base_url)?,
      timeout:    Duration::from_secs(10),
      user_agent: Self::DEFAULT_USER_AGENT.to_owned(),
    })
  }
}

/// Fetches and parses one year page per call.
///
/// The inner [`reqwest::Client`] pools connections across calls.
pub struct HttpFetcher {
  client: Client,
  config: FetcherConfig,
  parser: PageParser,
}

impl HttpFetcher {
  pub fn new(config: FetcherConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, config, parser: PageParser::new()? })
  }

  async fn get_page(&self, url: &str) -> Result<String> {
    let resp = self
      .client
      .get(url)
      .header(header::ACCEPT, "text/html")
      .send()
      .await?
      .error_for_status()?;
    Ok(resp.text().await?)
  }
}

impl Fetcher for HttpFetcher {
  fn source_url(&self, year: i32) -> String {
    format!(
      "{}/en-us/lifecycle/end-of-support/end-of-support-{year}",
      self.config.base_url.as_str().trim_end_matches('/')
    )
  }

  async fn fetch_year(&self, year: i32) -> YearFetchResult {
    let url = self.source_url(year);
    tracing::info!(year, %url, "fetching year page");

    let html = match self.get_page(&url).await {
      Ok(html) => html,
      Err(e) => {
        let error = describe(&e);
        tracing::warn!(year, %url, %error, "could not fetch year page");
        return YearFetchResult::failed(year, url, error);
      }
    };

    let page = self.parser.parse(&html);
    let records = normalize_all(&page.products, year, &self.config.base_url);
    tracing::info!(year, products = records.len(), "parsed year page");

    YearFetchResult::fetched(year, url, page.title, records)
  }
}

/// The error and every cause beneath it, joined with `": "`.
fn describe(e: &crate::Error) -> String {
  let mut msg = e.to_string();
  let mut cause = std::error::Error::source(e);
  while let Some(c) = cause {
    msg.push_str(": ");
    msg.push_str(&c.to_string());
    cause = c.source();
  }
  msg
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn year_page_url() {
    let fetcher = HttpFetcher::new(FetcherConfig::new("https://learn.microsoft.com/").unwrap())
      .unwrap();
    assert_eq!(
      fetcher.source_url(2026),
      "https://learn.microsoft.com/en-us/lifecycle/end-of-support/end-of-support-2026"
    );
  }

  #[test]
  fn rejects_invalid_base_url() {
    assert!(FetcherConfig::new("not a url").is_err());
  }

  #[tokio::test]
  async fn unreachable_host_becomes_failed_result() {
    // Nothing listens on the discard port of the loopback interface.
    let mut config = FetcherConfig::new("http://127.0.0.1:9").unwrap();
    config.timeout = Duration::from_secs(2);
    let fetcher = HttpFetcher::new(config).unwrap();

    let result = fetcher.fetch_year(2025).await;

    assert_eq!(result.year, 2025);
    assert!(result.is_failed());
    assert!(result.records().is_empty());
    assert!(result.source_url.ends_with("end-of-support-2025"));
    assert!(result.error().unwrap().contains("127.0.0.1:9"));
  }
}
