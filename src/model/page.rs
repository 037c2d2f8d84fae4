//! Page definitions: paper geometry, margins, and an ordered band list
//! with name-resolved cross-references.
//!
//! Grounded on `units::PaperSize`'s `Page::a4()`-style named-constructor
//! convention.

use std::collections::HashMap;

use super::band::{Band, DataBandSource};
use crate::error::{ReportError, Result};
use crate::units::{Margins, Orientation, PaperSize};

#[derive(Debug, Clone)]
pub struct Page {
    pub name: Option<String>,
    pub size: PaperSize,
    pub margins: Margins,
    pub orientation: Orientation,
    /// If set, `ReportTitle` prints before the page header on the first
    /// page instead of after it.
    pub title_before_header: bool,
    pub watermark: Option<String>,
    /// Set once a subreport object is found referencing this page, so
    /// the top-level page pass skips it — the referenced page is driven
    /// inline from its host instead.
    subreport_target: bool,
    bands: Vec<Band>,
    name_index: HashMap<String, usize>,
}

impl Page {
    pub fn new() -> Self {
        Self {
            name: None,
            size: PaperSize::default(),
            margins: Margins::default(),
            orientation: Orientation::default(),
            title_before_header: false,
            watermark: None,
            subreport_target: false,
            bands: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark this page as a subreport target, excluding it from the
    /// top-level page pass.
    pub fn mark_as_subreport_target(&mut self) {
        self.subreport_target = true;
    }

    pub fn is_subreport_target(&self) -> bool {
        self.subreport_target
    }

    /// Effective content width accounting for orientation.
    pub fn content_size(&self) -> PaperSize {
        match self.orientation {
            Orientation::Portrait => self.size,
            Orientation::Landscape => self.size.landscape(),
        }
    }

    /// Add a band, returning its index for use in subsequent `link_*`
    /// calls. If the band carries a name, it becomes addressable via
    /// [`Page::index_of`] — this is how forward references resolve:
    /// siblings are added first, then linked by name.
    pub fn add_band(&mut self, band: Band) -> usize {
        let index = self.bands.len();
        if let Some(name) = band.common().name.clone() {
            self.name_index.insert(name, index);
        }
        self.bands.push(band);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn band(&self, index: usize) -> &Band {
        &self.bands[index]
    }

    pub fn band_mut(&mut self, index: usize) -> &mut Band {
        &mut self.bands[index]
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    fn band_name(&self, index: usize) -> String {
        self.bands[index]
            .common()
            .name
            .clone()
            .unwrap_or_else(|| format!("#{index}"))
    }

    /// Link a data band to its header band (by index). Both must already
    /// be present on the page.
    pub fn link_header(&mut self, data_band: usize, header: usize) -> Result<()> {
        match self.band_mut(data_band) {
            Band::DataBand(d) => {
                d.header = Some(header);
                Ok(())
            }
            _ => Err(ReportError::UnknownBandReference(
                self.band_name(data_band),
                self.band_name(header),
            )),
        }
    }

    pub fn link_footer(&mut self, data_band: usize, footer: usize) -> Result<()> {
        match self.band_mut(data_band) {
            Band::DataBand(d) => {
                d.footer = Some(footer);
                Ok(())
            }
            _ => Err(ReportError::UnknownBandReference(
                self.band_name(data_band),
                self.band_name(footer),
            )),
        }
    }

    /// Link a data band to the group header that drives it, and the
    /// group header back to the data band it owns — both directions are
    /// set from a single call since the invariant is symmetric ("a
    /// GroupHeader references exactly one DataBand").
    pub fn link_group_header(&mut self, data_band: usize, group_header: usize) -> Result<()> {
        let data_band_name = self.band_name(data_band);
        let group_header_name = self.band_name(group_header);
        match self.band_mut(data_band) {
            Band::DataBand(d) => d.group_header = Some(group_header),
            _ => {
                return Err(ReportError::UnknownBandReference(
                    data_band_name.clone(),
                    group_header_name.clone(),
                ))
            }
        }
        match self.band_mut(group_header) {
            Band::GroupHeader(g) => g.child = Some(data_band),
            _ => {
                return Err(ReportError::OrphanGroupHeader(group_header_name));
            }
        }
        Ok(())
    }

    /// Link an outer group header to a nested group header one level
    /// down, for multi-level grouping. Unlike [`Page::link_group_header`]
    /// the inner band has no back-pointer to set — a `GroupHeader` has no
    /// `group_header` field of its own, only `DataBand` does.
    pub fn link_nested_group(&mut self, outer: usize, inner: usize) -> Result<()> {
        let outer_name = self.band_name(outer);
        let inner_name = self.band_name(inner);
        if !matches!(self.band(inner), Band::GroupHeader(_)) {
            return Err(ReportError::UnknownBandReference(outer_name, inner_name));
        }
        match self.band_mut(outer) {
            Band::GroupHeader(g) => g.child = Some(inner),
            _ => return Err(ReportError::OrphanGroupHeader(outer_name)),
        }
        Ok(())
    }

    pub fn link_group_footer(&mut self, group_header: usize, group_footer: usize) -> Result<()> {
        let group_header_name = self.band_name(group_header);
        match self.band_mut(group_header) {
            Band::GroupHeader(g) => g.footer = Some(group_footer),
            _ => return Err(ReportError::OrphanGroupHeader(group_header_name)),
        }
        match self.band_mut(group_footer) {
            Band::GroupFooter(f) => f.group_header = Some(group_header),
            _ => return Err(ReportError::OrphanGroupFooter(self.band_name(group_footer))),
        }
        Ok(())
    }

    /// Validate the page's structural invariants after construction and
    /// linking. Called once before preparation (configuration errors are
    /// fatal and abort before any data is touched).
    pub fn finalize(&self) -> Result<()> {
        let mut seen_header = false;
        let mut seen_footer = false;
        let mut seen_title = false;
        let mut seen_summary = false;

        for band in &self.bands {
            match band {
                Band::PageHeader(_) => {
                    if seen_header {
                        return Err(ReportError::DuplicateSingletonBand("page header"));
                    }
                    seen_header = true;
                }
                Band::PageFooter(_) => {
                    if seen_footer {
                        return Err(ReportError::DuplicateSingletonBand("page footer"));
                    }
                    seen_footer = true;
                }
                Band::ReportTitle(_) => {
                    if seen_title {
                        return Err(ReportError::DuplicateSingletonBand("report title"));
                    }
                    seen_title = true;
                }
                Band::ReportSummary(_) => {
                    if seen_summary {
                        return Err(ReportError::DuplicateSingletonBand("report summary"));
                    }
                    seen_summary = true;
                }
                Band::DataBand(d) => {
                    if matches!(d.source, DataBandSource::RowCount(_))
                        && matches!(d.source, DataBandSource::DataSource(_))
                    {
                        // Unreachable with this enum shape, kept for readers:
                        // the two sources are encoded as one mutually
                        // exclusive field, so this branch can never fire.
                    }
                }
                Band::GroupHeader(g) => {
                    if g.expression.is_none() && g.field.is_none() {
                        return Err(ReportError::MissingGroupExpression(self.band_name(
                            self.index_of_band(band).expect("band belongs to this page"),
                        )));
                    }
                    if g.child.is_none() {
                        return Err(ReportError::OrphanGroupHeader(
                            band.common().name.clone().unwrap_or_default(),
                        ));
                    }
                }
                Band::GroupFooter(f) => {
                    if f.group_header.is_none() {
                        return Err(ReportError::OrphanGroupFooter(
                            band.common().name.clone().unwrap_or_default(),
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn index_of_band(&self, needle: &Band) -> Option<usize> {
        self.bands.iter().position(|b| std::ptr::eq(b, needle))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::band::{BandCommon, DataBand, GroupHeaderBand};

    #[test]
    fn forward_name_reference_resolves_after_sibling_added() {
        let mut page = Page::new();
        let data_band = page.add_band(Band::DataBand(DataBand {
            common: BandCommon::new(20.0).named("DB1"),
            source: DataBandSource::RowCount(5),
            header: None,
            footer: None,
            group_header: None,
        }));
        let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
            common: BandCommon::new(15.0).named("GH1"),
            expression: Some("record.category".to_string()),
            field: None,
            child: None,
            footer: None,
        }));
        page.link_group_header(data_band, group_header).unwrap();
        assert!(page.finalize().is_ok());
    }

    #[test]
    fn missing_group_expression_is_fatal() {
        let mut page = Page::new();
        let data_band = page.add_band(Band::DataBand(DataBand {
            common: BandCommon::new(20.0).named("DB1"),
            source: DataBandSource::RowCount(5),
            header: None,
            footer: None,
            group_header: None,
        }));
        let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
            common: BandCommon::new(15.0).named("GH1"),
            expression: None,
            field: None,
            child: None,
            footer: None,
        }));
        page.link_group_header(data_band, group_header).unwrap();
        assert!(matches!(
            page.finalize(),
            Err(ReportError::MissingGroupExpression(_))
        ));
    }

    #[test]
    fn duplicate_page_header_rejected() {
        let mut page = Page::new();
        page.add_band(Band::PageHeader(BandCommon::new(10.0)));
        page.add_band(Band::PageHeader(BandCommon::new(10.0)));
        assert!(matches!(
            page.finalize(),
            Err(ReportError::DuplicateSingletonBand("page header"))
        ));
    }
}
