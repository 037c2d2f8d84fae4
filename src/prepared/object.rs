use serde::Serialize;

use crate::graphics::Color;
use crate::model::style::{BrushStyle, HAlign, VAlign};
use crate::model::{BarcodeSymbology, LineDirection, SizeMode};

fn color_hex(color: &Color) -> String {
    let rgb = color.to_rgb();
    format!(
        "#{:02x}{:02x}{:02x}",
        (rgb.r() * 255.0).round() as u8,
        (rgb.g() * 255.0).round() as u8,
        (rgb.b() * 255.0).round() as u8,
    )
}

/// A fully laid-out, rendered text object. Geometry and style are
/// resolved — no reference back to the definition survives.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedText {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub font_name: String,
    pub font_size: f64,
    pub font_bold: bool,
    pub font_italic: bool,
    pub color: String,
    pub background: Option<String>,
    pub brush_style: BrushStyle,
    pub halign: HAlign,
    pub valign: VAlign,
    pub wrap: bool,
    pub can_grow: bool,
    /// Set when expression evaluation hit a missing name, type error, or
    /// a helper exception — the text still holds the error placeholder.
    pub error: bool,
}

impl PreparedText {
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "text": self.text,
            "fontSize": self.font_size,
            "fontName": self.font_name,
            "error": self.error,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparedImage {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub size_mode: SizeMode,
    #[serde(skip)]
    pub picture: Option<std::sync::Arc<[u8]>>,
}

impl PreparedImage {
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "sizeMode": self.size_mode as u8,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparedLine {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub direction: LineDirection,
    pub line_width: f64,
    pub color: String,
}

impl PreparedLine {
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "lineWidth": self.line_width,
            "color": self.color,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparedBarcode {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub symbology: BarcodeSymbology,
    pub data: String,
}

impl PreparedBarcode {
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "data": self.data,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparedTable {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreparedTable {
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "left": self.left,
            "top": self.top,
            "height": self.height,
            "width": self.width,
            "headers": self.headers,
            "rows": self.rows,
        })
    }
}

/// A prepared band's leaf objects, resolved from [`crate::model::BandObject`].
#[derive(Debug, Clone, Serialize)]
pub enum PreparedObject {
    Text(PreparedText),
    Image(PreparedImage),
    Line(PreparedLine),
    Barcode(PreparedBarcode),
    Table(PreparedTable),
}

impl PreparedObject {
    pub fn dump(&self) -> serde_json::Value {
        match self {
            PreparedObject::Text(t) => t.dump(),
            PreparedObject::Image(i) => i.dump(),
            PreparedObject::Line(l) => l.dump(),
            PreparedObject::Barcode(b) => b.dump(),
            PreparedObject::Table(t) => t.dump(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PreparedObject::Text(t) if t.error)
    }
}

pub(crate) fn color_to_hex(color: &Color) -> String {
    color_hex(color)
}
