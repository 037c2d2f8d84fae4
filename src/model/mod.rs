//! Report definition types: the immutable structure a preparation run
//! consumes.

pub mod band;
pub mod barcode;
pub mod image;
pub mod object;
pub mod page;
pub mod report;
pub mod style;

pub use band::{Band, BandCommon, DataBand, DataBandSource, GroupFooterBand, GroupHeaderBand};
pub use barcode::{BarcodeSource, BarcodeSymbology};
pub use image::{ImageSource, SizeMode};
pub use object::{
    BandObject, BarcodeObject, ImageObject, LineDirection, LineObject, ObjectBox, SubreportObject,
    TableColumn, TableObject, TextObject,
};
pub use page::Page;
pub use report::Report;
pub use style::{Border, BorderSides, BrushStyle, DisplayFormat, DisplayKind, Font, HAlign, Highlight, Padding, VAlign};
