//! Page geometry allocation: cursor tracking, overflow, and the bottom
//! stack for `print_on_bottom` bands.

mod page_layouter;

pub use page_layouter::{BandProducer, DeferredEntry, NewPageCallback, PageLayouter, PageState};
