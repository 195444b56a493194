//! Tracing setup for the binary.
//!
//! Events always go to stderr. When `log_file` is configured they are also
//! appended, without ANSI colours, to that file through a background writer.

use std::path::Path;

use anyhow::Context as _;
use tracing::level_filters::LevelFilter;
use tracing_appender::{
  non_blocking::{NonBlocking, WorkerGuard},
  rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Open `path` for appending behind a non-blocking writer.
///
/// Buffered lines are flushed when the returned guard is dropped.
pub fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
  let file_name = path
    .file_name()
    .with_context(|| format!("log file {} has no file name", path.display()))?
    .to_string_lossy()
    .into_owned();
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));

  let appender = RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(file_name)
    .build(dir)
    .with_context(|| format!("failed to open log file {}", path.display()))?;

  Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. Keep the returned guard alive until exit.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
  let (file_layer, guard) = match log_file {
    Some(path) => {
      let (writer, guard) = file_writer(path)?;
      (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(file_layer)
    .init();

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn file_writer_appends_to_the_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lapse.log");
    std::fs::write(&path, "earlier line\n").unwrap();

    let (mut writer, guard) = file_writer(&path).unwrap();
    writer.write_all(b"fetching year pages\n").unwrap();
    drop(guard);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "earlier line\nfetching year pages\n");
  }

  #[test]
  fn file_writer_rejects_a_path_without_file_name() {
    assert!(file_writer(Path::new("/")).is_err());
  }
}
