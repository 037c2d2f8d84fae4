use serde::Serialize;

use crate::graphics::Color;
use crate::prepared::object::PreparedObject;

/// A single rendered band instance on a [`super::PreparedPage`]: geometry
/// is absolute (page-relative), not band-definition-relative, and every
/// object inside it has already been measured and rendered.
///
/// Grounded on original_source `PreparedBand` (`reptile/runtime/stream.py`):
/// `left/top/width/height` plus the band's resolved objects. The
/// original's `bottom` field (`top + height`, set by `Page.new_page`) is
/// modeled here as [`PreparedBand::bottom`], a derived accessor rather
/// than a separately-stored field, since nothing ever observes it before
/// `height` is final.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedBand {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// The band-definition kind this was prepared from (e.g. "DataBand",
    /// "GroupHeader", "PageHeader") — carried through for `dump()`
    /// consumers that branch on band type.
    pub kind: String,
    pub background: Option<String>,
    pub objects: Vec<PreparedObject>,
}

impl PreparedBand {
    pub fn new(kind: impl Into<String>, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            kind: kind.into(),
            background: None,
            objects: Vec::new(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(super::object::color_to_hex(&color));
        self
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn has_errors(&self) -> bool {
        self.objects.iter().any(PreparedObject::is_error)
    }

    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "bandType": self.kind,
            "objects": self.objects.iter().map(PreparedObject::dump).collect::<Vec<_>>(),
        })
    }
}
