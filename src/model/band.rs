//! Band definitions: a tagged variant per band kind, with cross-band
//! references resolved to indices (not back-pointers) by
//! [`super::page::Page::link_group_header`] and friends, per the
//! "model as indices into the owning page's band list" design note.

use super::object::BandObject;
use crate::error::{ReportError, Result};
use crate::graphics::Color;

#[derive(Debug, Clone)]
pub struct BandCommon {
    pub name: Option<String>,
    pub height: f64,
    pub width: Option<f64>,
    pub background: Option<Color>,
    pub print_on_bottom: bool,
    /// Index, within the same page, of a band printed immediately after
    /// this one as a continuation.
    pub child_band: Option<usize>,
    pub objects: Vec<BandObject>,
}

impl BandCommon {
    pub fn new(height: f64) -> Self {
        Self {
            name: None,
            height,
            width: None,
            background: None,
            print_on_bottom: false,
            child_band: None,
            objects: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_objects(mut self, objects: Vec<BandObject>) -> Self {
        self.objects = objects;
        self
    }

    pub fn on_bottom(mut self) -> Self {
        self.print_on_bottom = true;
        self
    }
}

/// What a `DataBand` iterates over: a datasource's records, or a bare
/// row count for data-less repetition. The two are mutually exclusive;
/// setting both is a load-time configuration error
/// (`ReportError::AmbiguousDataBandSource`) rather than a guess at which
/// one was meant.
#[derive(Debug, Clone)]
pub enum DataBandSource {
    RowCount(u64),
    DataSource(String),
}

impl DataBandSource {
    /// Resolve a raw, possibly-ambiguous pair of attributes (as a host
    /// loading a report definition from an external format would read
    /// them) into exactly one source. Fatal if both are present; never
    /// guess which one was meant, reject at load time instead.
    pub fn from_raw(
        band_name: &str,
        row_count: Option<u64>,
        data_source: Option<String>,
    ) -> Result<Self> {
        match (row_count, data_source) {
            (Some(_), Some(_)) => Err(ReportError::AmbiguousDataBandSource(band_name.to_string())),
            (Some(n), None) => Ok(DataBandSource::RowCount(n)),
            (None, Some(name)) => Ok(DataBandSource::DataSource(name)),
            (None, None) => Ok(DataBandSource::RowCount(0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataBand {
    pub common: BandCommon,
    pub source: DataBandSource,
    pub header: Option<usize>,
    pub footer: Option<usize>,
    pub group_header: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GroupHeaderBand {
    pub common: BandCommon,
    /// A full expression (e.g. `record.category`), or `None` if `field`
    /// is set instead. Exactly one of the two must be present,
    /// otherwise `ReportError::MissingGroupExpression` (fatal).
    pub expression: Option<String>,
    pub field: Option<String>,
    /// The band this group header drives for each group's sublist: either
    /// the `DataBand` it owns, or (for nested grouping, recurse if it is
    /// another `GroupHeader`) one level down. Resolved by index rather
    /// than a tree, per the
    /// "cyclic references as indices" design note.
    pub child: Option<usize>,
    pub footer: Option<usize>,
}

impl GroupHeaderBand {
    /// The expression text to compile for grouping, preferring
    /// `expression` over a bare `field` reference. A `field` names a
    /// record attribute directly (e.g. `category`), so it is expanded to
    /// `record.<field>` the way the original prepends `record.` to a
    /// bare field name before compiling it.
    pub fn grouping_source(&self) -> Option<String> {
        self.expression
            .clone()
            .or_else(|| self.field.as_deref().map(|field| format!("record.{field}")))
    }
}

#[derive(Debug, Clone)]
pub struct GroupFooterBand {
    pub common: BandCommon,
    pub group_header: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum Band {
    PageHeader(BandCommon),
    PageFooter(BandCommon),
    ReportTitle(BandCommon),
    ReportSummary(BandCommon),
    Header(BandCommon),
    Footer(BandCommon),
    DataBand(DataBand),
    GroupHeader(GroupHeaderBand),
    GroupFooter(GroupFooterBand),
    ChildBand(BandCommon),
}

impl Band {
    pub fn common(&self) -> &BandCommon {
        match self {
            Band::PageHeader(c)
            | Band::PageFooter(c)
            | Band::ReportTitle(c)
            | Band::ReportSummary(c)
            | Band::Header(c)
            | Band::Footer(c)
            | Band::ChildBand(c) => c,
            Band::DataBand(d) => &d.common,
            Band::GroupHeader(g) => &g.common,
            Band::GroupFooter(g) => &g.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut BandCommon {
        match self {
            Band::PageHeader(c)
            | Band::PageFooter(c)
            | Band::ReportTitle(c)
            | Band::ReportSummary(c)
            | Band::Header(c)
            | Band::Footer(c)
            | Band::ChildBand(c) => c,
            Band::DataBand(d) => &mut d.common,
            Band::GroupHeader(g) => &mut g.common,
            Band::GroupFooter(g) => &mut g.common,
        }
    }

    pub fn height(&self) -> f64 {
        self.common().height
    }

    /// True for band kinds that print once per physical page rather
    /// than as part of the root-band data pass.
    pub fn is_page_singleton(&self) -> bool {
        matches!(
            self,
            Band::PageHeader(_) | Band::PageFooter(_) | Band::ReportTitle(_) | Band::ReportSummary(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_header_prefers_expression_over_field() {
        let group = GroupHeaderBand {
            common: BandCommon::new(20.0),
            expression: Some("record.category".to_string()),
            field: Some("category".to_string()),
            child: None,
            footer: None,
        };
        assert_eq!(group.grouping_source().as_deref(), Some("record.category"));
    }

    #[test]
    fn group_header_expands_bare_field_to_record_path() {
        let group = GroupHeaderBand {
            common: BandCommon::new(20.0),
            expression: None,
            field: Some("category".to_string()),
            child: None,
            footer: None,
        };
        assert_eq!(group.grouping_source().as_deref(), Some("record.category"));
    }

    #[test]
    fn ambiguous_data_band_source_is_rejected() {
        let result = DataBandSource::from_raw("DB1", Some(10), Some("orders".to_string()));
        assert!(matches!(result, Err(crate::error::ReportError::AmbiguousDataBandSource(_))));
    }

    #[test]
    fn page_singleton_classification() {
        assert!(Band::PageHeader(BandCommon::new(10.0)).is_page_singleton());
        assert!(!Band::DataBand(DataBand {
            common: BandCommon::new(10.0),
            source: DataBandSource::RowCount(1),
            header: None,
            footer: None,
            group_header: None,
        })
        .is_page_singleton());
    }
}
