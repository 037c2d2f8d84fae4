//! Shared styling types for band objects: fonts, borders, padding,
//! alignment, highlight overrides, and display formatting.
//!
//! `Padding`'s constructor set is grounded on
//! `advanced_tables::cell_style::Padding` (`new`/`uniform`/`symmetric`
//! plus horizontal/vertical totals); `Border`, `Highlight`, `BrushStyle`
//! and `DisplayFormat` are grounded on original_source's `Border`
//! IntFlag, `Highlight`, `BrushStyle` and `DisplayFormat` classes
//! (`reptile/_engine.py`, `reptile/runtime/stream.py`).

use serde::Serialize;

use crate::graphics::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Helvetica".to_string(),
            size: 10.0,
            bold: false,
            italic: false,
            color: Color::black(),
        }
    }
}

/// Which sides of an object's box carry a stroke. The original models
/// this as an `IntFlag` bitmask (`top|right|bottom|left`); a plain
/// four-bool struct is the idiomatic Rust equivalent without an added
/// bitflags dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSides {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl BorderSides {
    pub fn all() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub sides: BorderSides,
    pub width: f64,
    pub color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            sides: BorderSides::none(),
            width: 1.0,
            color: Color::black(),
        }
    }
}

/// Space between an object's border and its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Vertical padding applied top/bottom, horizontal applied left/right.
    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn horizontal_total(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical_total(&self) -> f64 {
        self.top + self.bottom
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(0.0)
    }
}

/// Horizontal alignment (`0=left,1=center,2=right,3=justify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum HAlign {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
    Justify = 3,
}

/// Vertical alignment (`0=top,1=center,2=bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum VAlign {
    #[default]
    Top = 0,
    Center = 1,
    Bottom = 2,
}

/// Whether a highlight/override paints a solid fill, grounded on
/// original_source's `BrushStyle` (`NONE`, `SOLID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BrushStyle {
    #[default]
    None,
    Solid,
}

/// The kind of value a `DisplayFormat` knows how to render, grounded on
/// original_source's `DisplayFormat.kind` (`'Numeric'`/`'DateTime'`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Numeric,
    DateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFormat {
    pub kind: DisplayKind,
    /// A `format!`-style spec for `Numeric` (e.g. `".2"`), or a
    /// `chrono` strftime pattern for `DateTime`.
    pub format: String,
}

/// A conditional style override evaluated once per object instance.
///
/// `condition` is a `{{ }}` expression; per the original's
/// `eval_condition`, the override applies only when the rendered text is
/// exactly the literal `"True"` (hence `Value::Bool`'s Python-flavoured
/// `Display` impl).
#[derive(Debug, Clone)]
pub struct Highlight {
    pub condition: String,
    pub background: Option<Color>,
    pub brush_style: Option<BrushStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_uniform_totals() {
        let padding = Padding::uniform(2.0);
        assert_eq!(padding.horizontal_total(), 4.0);
        assert_eq!(padding.vertical_total(), 4.0);
    }

    #[test]
    fn alignment_defaults_match_spec_encoding() {
        assert_eq!(HAlign::default() as u8, 0);
        assert_eq!(VAlign::default() as u8, 0);
    }
}
