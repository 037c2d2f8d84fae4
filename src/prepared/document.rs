use serde::Serialize;

use crate::prepared::page::PreparedPage;

/// The end product of a preparation run: a geometry-resolved, fully
/// rendered sequence of pages, independent of the [`crate::model::Report`]
/// definition and any open data sources that produced it.
///
/// Grounded on original_source's `Band.prepare` return value, a flat list
/// of `PreparedPage`s collected by `Report.prepare` (`reptile/_engine.py`).
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pages: Vec<PreparedPage>,
}

impl Document {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn push_page(&mut self, page: PreparedPage) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[PreparedPage] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut Vec<PreparedPage> {
        &mut self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.pages.iter().any(PreparedPage::has_errors)
    }

    /// JSON-serialisable dump of the whole document.
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "pageCount": self.page_count(),
            "pages": self.pages.iter().map(PreparedPage::dump).collect::<Vec<_>>(),
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
