//! Record normalizer: raw page fragments → canonical [`ProductRecord`]s.

use url::Url;

use crate::{Error, Result, product::ProductRecord};

/// A product link as it appears in the page markup, before any cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
  /// The link text.
  pub name:        String,
  /// Text of the row's support-end cell.
  pub support_end: String,
  /// The link's `href`, usually a site-relative path.
  pub href:        Option<String>,
}

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// Page text frequently carries line breaks and indentation from the markup.
pub fn clean_text(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against `base`. Absolute URLs are kept as they are; values
/// that cannot be resolved are dropped.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
  let href = href.trim();
  if href.is_empty() {
    return None;
  }
  base.join(href).ok().map(String::from)
}

/// Turn a raw fragment into a [`ProductRecord`] for `year`.
///
/// Fails with [`Error::EmptyProductName`] when the link has no visible text.
pub fn normalize(raw: &RawProduct, year: i32, base: &Url) -> Result<ProductRecord> {
  let name = clean_text(&raw.name);
  if name.is_empty() {
    return Err(Error::EmptyProductName);
  }

  Ok(ProductRecord {
    name,
    year,
    support_end_label: clean_text(&raw.support_end),
    product_url: raw.href.as_deref().and_then(|h| resolve_url(base, h)),
  })
}

/// Normalize a whole page, dropping fragments that cannot become records.
pub fn normalize_all(raws: &[RawProduct], year: i32, base: &Url) -> Vec<ProductRecord> {
  raws
    .iter()
    .filter_map(|raw| match normalize(raw, year, base) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::debug!(year, href = ?raw.href, "skipping product fragment: {e}");
        None
      }
    })
    .collect()
}
