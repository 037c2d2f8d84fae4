use serde::Serialize;

use crate::prepared::band::PreparedBand;

/// One physical page of output: an ordered list of prepared bands plus
/// the geometry the layouter used while filling it.
///
/// Grounded on original_source `PreparedPage` (`reptile/runtime/stream.py`):
/// `width/height/bands/index`. The original's live layout cursor
/// (`x/y/ay`, the bottom-stack) belongs to [`crate::layout::PageLayouter`]
/// while it is filling this page — once a page is finished the cursor is
/// discarded and only the placed bands remain here.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPage {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub watermark: Option<String>,
    bands: Vec<PreparedBand>,
}

impl PreparedPage {
    pub fn new(index: usize, width: f64, height: f64) -> Self {
        Self {
            index,
            width,
            height,
            watermark: None,
            bands: Vec::new(),
        }
    }

    pub fn with_watermark(mut self, watermark: Option<String>) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn push_band(&mut self, band: PreparedBand) {
        self.bands.push(band);
    }

    pub fn bands(&self) -> &[PreparedBand] {
        &self.bands
    }

    pub fn bands_mut(&mut self) -> &mut Vec<PreparedBand> {
        &mut self.bands
    }

    pub fn has_errors(&self) -> bool {
        self.bands.iter().any(PreparedBand::has_errors)
    }

    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "index": self.index,
            "width": self.width,
            "height": self.height,
            "bands": self.bands.iter().map(PreparedBand::dump).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_starts_empty() {
        let page = PreparedPage::new(0, 595.0, 842.0);
        assert!(page.bands().is_empty());
        assert!(!page.has_errors());
    }

    #[test]
    fn push_band_appends_in_order() {
        let mut page = PreparedPage::new(0, 595.0, 842.0);
        page.push_band(PreparedBand::new("PageHeader", 0.0, 0.0, 595.0, 30.0));
        page.push_band(PreparedBand::new("DataBand", 0.0, 30.0, 595.0, 20.0));
        assert_eq!(page.bands()[0].kind, "PageHeader");
        assert_eq!(page.bands()[1].kind, "DataBand");
    }
}
