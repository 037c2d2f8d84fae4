//! Band objects: the positioned leaves of a band (text, image, line,
//! barcode, table).
//!
//! Grounded on original_source's `Text`/`Image`/`Line`/`Barcode` classes
//! (`reptile/_engine.py`) for the attribute set, and on
//! `advanced_tables::cell_style`'s builder idiom (`&mut Self`-returning
//! setters) for constructing them.

use super::barcode::{BarcodeSource, BarcodeSymbology};
use super::image::{ImageSource, SizeMode};
use super::style::{Border, DisplayFormat, Font, HAlign, Highlight, Padding, VAlign};
use crate::graphics::Color;

/// Left/top/width/height shared by every band object, plus an optional
/// name for cross-referencing (subreport targets, debugging dumps).
#[derive(Debug, Clone)]
pub struct ObjectBox {
    pub name: Option<String>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ObjectBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            name: None,
            left,
            top,
            width,
            height,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TextObject {
    pub bounds: ObjectBox,
    /// Raw `{{ }}`/`${ }` template source, compiled lazily by the band pass.
    pub template: String,
    pub font: Font,
    pub border: Border,
    pub padding: Padding,
    pub halign: HAlign,
    pub valign: VAlign,
    pub background: Option<Color>,
    pub display_format: Option<DisplayFormat>,
    pub can_grow: bool,
    pub can_shrink: bool,
    pub word_wrap: bool,
    pub allow_tags: bool,
    pub highlight: Option<Highlight>,
}

impl TextObject {
    pub fn new(bounds: ObjectBox, template: impl Into<String>) -> Self {
        Self {
            bounds,
            template: template.into(),
            font: Font::default(),
            border: Border::default(),
            padding: Padding::default(),
            halign: HAlign::default(),
            valign: VAlign::default(),
            background: None,
            display_format: None,
            can_grow: false,
            can_shrink: false,
            word_wrap: true,
            allow_tags: false,
            highlight: None,
        }
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    pub fn growable(mut self) -> Self {
        self.can_grow = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ImageObject {
    pub bounds: ObjectBox,
    pub source: ImageSource,
    pub size_mode: SizeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LineDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct LineObject {
    pub bounds: ObjectBox,
    pub direction: LineDirection,
    pub stroke_color: Color,
    pub stroke_width: f64,
}

#[derive(Debug, Clone)]
pub struct BarcodeObject {
    pub bounds: ObjectBox,
    pub symbology: BarcodeSymbology,
    pub source: BarcodeSource,
}

#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: Option<String>,
    pub width: f64,
    /// Record field rendered in this column for each data row.
    pub field: String,
}

#[derive(Debug, Clone)]
pub struct TableObject {
    pub bounds: ObjectBox,
    pub columns: Vec<TableColumn>,
    pub border: Border,
    /// Named data source driving one row per record. `None` renders a
    /// single row against whatever `record` is already bound in context
    /// (e.g. a table nested inside a data band).
    pub data_source: Option<String>,
}

/// A band object that drives another page's root bands in place, at an
/// offset from the current cursor.
#[derive(Debug, Clone)]
pub struct SubreportObject {
    pub bounds: ObjectBox,
    /// The name of the `Page` to drive.
    pub page_name: String,
}

#[derive(Debug, Clone)]
pub enum BandObject {
    Text(TextObject),
    Image(ImageObject),
    Line(LineObject),
    Barcode(BarcodeObject),
    Table(TableObject),
    Subreport(SubreportObject),
}

impl BandObject {
    pub fn bounds(&self) -> &ObjectBox {
        match self {
            BandObject::Text(o) => &o.bounds,
            BandObject::Image(o) => &o.bounds,
            BandObject::Line(o) => &o.bounds,
            BandObject::Barcode(o) => &o.bounds,
            BandObject::Table(o) => &o.bounds,
            BandObject::Subreport(o) => &o.bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_object_defaults_are_left_top_aligned() {
        let text = TextObject::new(ObjectBox::new(0.0, 0.0, 100.0, 12.0), "{{ line }}");
        assert_eq!(text.halign, HAlign::Left);
        assert_eq!(text.valign, VAlign::Top);
        assert!(!text.can_grow);
    }

    #[test]
    fn growable_builder_sets_flag() {
        let text = TextObject::new(ObjectBox::new(0.0, 0.0, 100.0, 12.0), "x").growable();
        assert!(text.can_grow);
    }
}
