//! The gate applied to a fetched batch before anything is written.

use std::io::{self, BufRead, BufReader, Write};

use lapse_core::product::YearFetchResult;

use crate::report;

/// Decides whether a fetched batch may be reconciled into the store.
pub trait Confirm {
  fn confirm(&mut self, batch: &[YearFetchResult]) -> io::Result<bool>;
}

/// Accepts every batch without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
  fn confirm(&mut self, _batch: &[YearFetchResult]) -> io::Result<bool> { Ok(true) }
}

/// Prints a preview of the batch and asks for a `y`/`n` answer.
///
/// Reading the answer blocks; the orchestrator runs it on the blocking pool.
pub struct PromptConfirm<R, W> {
  input:  R,
  output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
  pub fn new(input: R, output: W) -> Self { Self { input, output } }
}

impl PromptConfirm<BufReader<io::Stdin>, io::Stderr> {
  /// Read answers from stdin; write the preview to stderr so stdout stays
  /// free for the final report.
  pub fn stdio() -> Self { Self::new(BufReader::new(io::stdin()), io::stderr()) }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
  fn confirm(&mut self, batch: &[YearFetchResult]) -> io::Result<bool> {
    let total: usize = batch.iter().map(|r| r.records().len()).sum();

    write!(self.output, "{}", report::preview(batch))?;
    write!(self.output, "Reconcile {total} records into the store? [y/N] ")?;
    self.output.flush()?;

    let mut line = String::new();
    self.input.read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use lapse_core::product::ProductRecord;

  use super::*;

  fn batch() -> Vec<YearFetchResult> {
    vec![YearFetchResult::fetched(
      2025,
      "https://example.test/2025",
      Some("Products reaching End of Support for 2025".into()),
      vec![ProductRecord {
        name:              "Office 2016".into(),
        year:              2025,
        support_end_label: "10/14/2025".into(),
        product_url:       None,
      }],
    )]
  }

  fn answer(input: &str) -> (bool, String) {
    let mut out = Vec::new();
    let ok = PromptConfirm::new(Cursor::new(input.as_bytes()), &mut out)
      .confirm(&batch())
      .unwrap();
    (ok, String::from_utf8(out).unwrap())
  }

  #[test]
  fn yes_answers_accept() {
    assert!(answer("y\n").0);
    assert!(answer("YES\n").0);
    assert!(answer("  y  \r\n").0);
  }

  #[test]
  fn anything_else_declines() {
    assert!(!answer("n\n").0);
    assert!(!answer("\n").0);
    assert!(!answer("").0);
    assert!(!answer("sure\n").0);
  }

  #[test]
  fn prompt_shows_preview_and_total() {
    let (_, shown) = answer("n\n");
    assert!(shown.contains("Office 2016"));
    assert!(shown.contains("Reconcile 1 records into the store?"));
  }

  #[test]
  fn auto_confirm_always_accepts() {
    assert!(AutoConfirm.confirm(&[]).unwrap());
  }
}
