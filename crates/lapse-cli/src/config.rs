//! Runtime configuration, read once at startup.
//!
//! Values come from an optional TOML file overlaid by `LAPSE_*` environment
//! variables (e.g. `LAPSE_STORE_PATH`).

use std::{
  ops::Range,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use lapse_fetch::FetcherConfig;
use lapse_store_sqlite::StoreConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LapseConfig {
  /// SQLite database file. Required.
  pub store_path:       PathBuf,
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms:  u64,
  #[serde(default = "default_base_url")]
  pub base_url:         String,
  /// First year to fetch; defaults to the current year.
  #[serde(default)]
  pub start_year:       Option<i32>,
  /// Number of consecutive years to fetch.
  #[serde(default = "default_year_span")]
  pub year_span:        u16,
  /// Pause between two page requests.
  #[serde(default = "default_request_delay_ms")]
  pub request_delay_ms: u64,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:     u64,
  #[serde(default = "default_user_agent")]
  pub user_agent:       String,
  /// Also append log events to this file.
  #[serde(default)]
  pub log_file:         Option<PathBuf>,
}

fn default_busy_timeout_ms() -> u64 { 5_000 }
fn default_base_url() -> String { FetcherConfig::DEFAULT_BASE_URL.to_owned() }
fn default_year_span() -> u16 { 5 }
fn default_request_delay_ms() -> u64 { 2_000 }
fn default_timeout_secs() -> u64 { 10 }
fn default_user_agent() -> String { FetcherConfig::DEFAULT_USER_AGENT.to_owned() }

impl LapseConfig {
  /// Read `file` (if it exists) and the `LAPSE_*` environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("LAPSE").try_parsing(true))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise LapseConfig")
  }

  /// The years to fetch, given the current calendar year.
  pub fn years(&self, current_year: i32) -> Range<i32> {
    let start = self.start_year.unwrap_or(current_year);
    start..start + i32::from(self.year_span)
  }

  pub fn request_delay(&self) -> Duration { Duration::from_millis(self.request_delay_ms) }

  pub fn store_config(&self) -> StoreConfig {
    StoreConfig {
      path:         self.store_path.clone(),
      busy_timeout: Duration::from_millis(self.busy_timeout_ms),
    }
  }

  pub fn fetcher_config(&self) -> anyhow::Result<FetcherConfig> {
    let mut fetcher = FetcherConfig::new(&self.base_url)
      .with_context(|| format!("invalid base_url {:?}", self.base_url))?;
    fetcher.timeout = Duration::from_secs(self.timeout_secs);
    fetcher.user_agent = self.user_agent.clone();
    Ok(fetcher)
  }
}
