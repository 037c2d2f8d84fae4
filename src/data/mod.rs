//! Tabular data sources and the aggregate-access proxy bound into the
//! evaluation context under each source's name.
//!
//! Grounded directly on original_source `reptile/_engine.py`
//! (`DataSource`, `DataProxy`): tabular record lists and the
//! aggregate-access wrapper over them have no analogue elsewhere in this
//! crate's lineage.

mod proxy;
mod source;

pub use proxy::DataProxy;
pub use source::{DataSourceState, VecDataSource};

use crate::value::Value;

/// A finite, restartable stream of records.
///
/// `open()` is idempotent — calling it on an already-open source is a
/// no-op, matching the original's `data` property ("if not self._opened:
/// self.open()"). `close()` releases the underlying rows; a closed
/// source can be reopened, at which point it yields its full record set
/// again from the start (grouping needs to materialise a sub-range into
/// a list, so record streams must be finite and restartable).
pub trait DataSource {
    fn name(&self) -> &str;
    fn open(&mut self);
    fn close(&mut self);
    fn is_open(&self) -> bool;
    /// The full, materialised record list. Opens the source first if
    /// it isn't already open, mirroring the original's lazy `data`
    /// property.
    fn records(&mut self) -> &[Value];
}
