//! The report root: data sources, pages, and report-scoped variables.
//!
//! Grounded on original_source's `Report` class (`reptile/_engine.py`)
//! for the owned-collections shape; immutable during preparation —
//! `prepare()` borrows it and a fresh [`crate::context::Context`] plus
//! [`crate::prepared::Document`] are produced each call.

use std::collections::HashMap;

use crate::data::DataSource;
use crate::error::Result;
use crate::model::page::Page;
use crate::value::Value;

pub struct Report {
    pub name: String,
    pages: Vec<Page>,
    data_sources: Vec<Box<dyn DataSource>>,
    pub variables: HashMap<String, Value>,
}

impl Report {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
            data_sources: Vec::new(),
            variables: HashMap::new(),
        }
    }

    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> &Page {
        &self.pages[index]
    }

    pub fn page_index_by_name(&self, name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.name.as_deref() == Some(name))
    }

    pub fn register_data_source(&mut self, source: Box<dyn DataSource>) {
        self.data_sources.push(source);
    }

    pub fn data_sources(&self) -> &[Box<dyn DataSource>] {
        &self.data_sources
    }

    pub fn data_sources_mut(&mut self) -> &mut [Box<dyn DataSource>] {
        &mut self.data_sources
    }

    pub fn data_source_mut(&mut self, name: &str) -> Option<&mut Box<dyn DataSource>> {
        self.data_sources.iter_mut().find(|ds| ds.name() == name)
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.variables.insert(key.into(), value);
        self
    }

    /// Validate every page's structural invariants. Called once before
    /// preparation begins — a configuration error here aborts the whole
    /// run.
    pub fn finalize(&self) -> Result<()> {
        for page in &self.pages {
            page.finalize()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_has_no_pages() {
        let report = Report::new("invoice");
        assert!(report.pages().is_empty());
    }

    #[test]
    fn page_index_by_name_finds_named_page() {
        let mut report = Report::new("invoice");
        report.add_page(Page::new().named("detail"));
        assert_eq!(report.page_index_by_name("detail"), Some(0));
        assert_eq!(report.page_index_by_name("missing"), None);
    }
}
