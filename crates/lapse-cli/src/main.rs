//! `lapse` binary.
//!
//! Fetches the Microsoft end-of-support year pages, shows what was found,
//! and, once confirmed, reconciles the products into the SQLite store under a
//! run ledger entry.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Datelike as _;
use clap::Parser;
use lapse_cli::{
  LapseConfig, Orchestrator, RunReport,
  confirm::{AutoConfirm, PromptConfirm},
  logging, report,
};
use lapse_fetch::HttpFetcher;
use lapse_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Track Microsoft end-of-support dates")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lapse.toml")]
  config: PathBuf,

  /// Reconcile without asking for confirmation.
  #[arg(short, long)]
  yes: bool,

  /// Print the finished run as JSON on stdout.
  #[arg(long)]
  json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let cfg = LapseConfig::load(&cli.config)?;

  // Logs go to stderr (and optionally a file); stdout carries the report.
  let _log_guard = logging::init(cfg.log_file.as_deref())?;

  let store = SqliteStore::connect(&cfg.store_config())
    .await
    .context("failed to open SQLite store")?;
  tracing::info!(path = %cfg.store_path.display(), "store opened");

  let fetcher = HttpFetcher::new(cfg.fetcher_config()?).context("failed to build HTTP client")?;
  let years = cfg.years(chrono::Local::now().year());
  tracing::info!(first = years.start, last = years.end - 1, "fetching year pages");

  let orchestrator = Orchestrator::new(fetcher, store, years, cfg.request_delay());
  let outcome = if cli.yes {
    orchestrator.execute(AutoConfirm).await?
  } else {
    orchestrator.execute(PromptConfirm::stdio()).await?
  };

  match outcome {
    RunReport::Declined { .. } => {
      eprintln!("Aborted; nothing was written.");
    }
    RunReport::Finished { entry, outcome, batch } => {
      if cli.json {
        let json = serde_json::to_string_pretty(&report::JsonReport {
          run:     &entry,
          outcome: &outcome,
        })?;
        println!("{json}");
      } else {
        print!("{}", report::summary(&entry, &outcome, &batch));
      }
    }
  }

  Ok(())
}
