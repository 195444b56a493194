//! HTML extraction for end-of-support year pages.
//!
//! Each page holds one or more tables. Every body row lists one or more
//! product links in its first cell and the support-end date in its second.

use lapse_core::normalize::{RawProduct, clean_text};
use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

const TITLE: &str = "h1";
const TABLE: &str = "table";
const BODY_ROW: &str = "tbody tr";
const PRODUCT_LINK: &str = r#"a[data-linktype="absolute-path"]"#;

/// Everything extracted from one page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
  pub title:    Option<String>,
  pub products: Vec<RawProduct>,
}

/// Holds the compiled selectors; build once and reuse for every page.
#[derive(Debug)]
pub struct PageParser {
  title:        Selector,
  table:        Selector,
  body_row:     Selector,
  product_link: Selector,
}

fn selector(s: &'static str) -> Result<Selector> {
  Selector::parse(s).map_err(|e| Error::Selector { selector: s, reason: e.to_string() })
}

impl PageParser {
  pub fn new() -> Result<Self> {
    Ok(Self {
      title:        selector(TITLE)?,
      table:        selector(TABLE)?,
      body_row:     selector(BODY_ROW)?,
      product_link: selector(PRODUCT_LINK)?,
    })
  }

  pub fn parse(&self, html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let title = doc
      .select(&self.title)
      .next()
      .map(|h| clean_text(&h.text().collect::<String>()))
      .filter(|t| !t.is_empty());

    let mut products = Vec::new();
    for table in doc.select(&self.table) {
      for row in table.select(&self.body_row) {
        let cells: Vec<ElementRef<'_>> = row
          .children()
          .filter_map(ElementRef::wrap)
          .filter(|el| el.value().name() == "td")
          .collect();

        // A product row needs at least the product cell and the date cell.
        let [product_cell, date_cell, ..] = cells.as_slice() else {
          continue;
        };

        let support_end = date_cell.text().collect::<String>();
        for link in product_cell.select(&self.product_link) {
          products.push(RawProduct {
            name:        link.text().collect(),
            support_end: support_end.clone(),
            href:        link.value().attr("href").map(str::to_owned),
          });
        }
      }
    }

    ParsedPage { title, products }
  }
}
