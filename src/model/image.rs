use std::sync::Arc;

use serde::Serialize;

/// Where an image object's bytes come from at preparation time.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Bytes embedded directly in the definition.
    Bytes(Arc<[u8]>),
    /// A record field holding image bytes, read during band processing.
    Field(String),
    /// A report/context variable holding image bytes.
    Variable(String),
}

/// How an image is fit into its object box
/// (`0=normal,1=center,2=auto,3=zoom,4=stretch`), grounded on
/// original_source's `SizeMode` `IntEnum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum SizeMode {
    #[default]
    Normal = 0,
    Center = 1,
    Auto = 2,
    Zoom = 3,
    Stretch = 4,
}
