//! The prepared document: geometry-resolved, text-rendered, data-less
//! output of a preparation run.
//!
//! Grounded on original_source `reptile/runtime/stream.py`
//! (`PreparedPage`/`PreparedBand`/`PreparedText`/`PreparedImage`/
//! `PreparedLine`/`PreparedBarcode`). Every type here derives
//! `serde::Serialize` so `dump()` is just `serde_json::to_value`: each
//! prepared object dumps to a plain record suitable for JSON
//! serialisation.

mod band;
mod document;
mod object;
mod page;

pub use band::PreparedBand;
pub use document::Document;
pub use object::{
    PreparedBarcode, PreparedImage, PreparedLine, PreparedObject, PreparedTable, PreparedText,
};
pub use page::PreparedPage;

/// Re-exported for `crate::render`, which builds `PreparedText`/`PreparedBand`
/// background colors outside this module.
pub(crate) use object::color_to_hex;
