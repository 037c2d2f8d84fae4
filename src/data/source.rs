use super::DataSource;
use crate::value::Value;

/// Closed → Opened lifecycle state: `open()` is idempotent, `close()` is
/// single-use (a second close on an already-closed source is also a
/// no-op).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceState {
    Closed,
    Opened,
}

/// An in-memory, `Vec`-backed data source — the default/reference
/// implementation. Grounded on the original's plain-list
/// `DataSource(name, data=[...])` constructor; a host wanting a
/// SQL-backed source implements [`DataSource`] itself (out of scope
/// here, see SPEC_FULL.md's Non-goals).
pub struct VecDataSource {
    name: String,
    records: Vec<Value>,
    state: DataSourceState,
}

impl VecDataSource {
    pub fn new(name: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            records,
            state: DataSourceState::Closed,
        }
    }
}

impl DataSource for VecDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) {
        self.state = DataSourceState::Opened;
    }

    fn close(&mut self) {
        self.state = DataSourceState::Closed;
    }

    fn is_open(&self) -> bool {
        self.state == DataSourceState::Opened
    }

    fn records(&mut self) -> &[Value] {
        if !self.is_open() {
            self.open();
        }
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_idempotent() {
        let mut source = VecDataSource::new("orders", vec![Value::Integer(1)]);
        source.open();
        source.open();
        assert!(source.is_open());
    }

    #[test]
    fn records_opens_lazily() {
        let mut source = VecDataSource::new("orders", vec![Value::Integer(1), Value::Integer(2)]);
        assert!(!source.is_open());
        assert_eq!(source.records().len(), 2);
        assert!(source.is_open());
    }

    #[test]
    fn close_then_reopen_yields_full_set_again() {
        let mut source = VecDataSource::new("orders", vec![Value::Integer(1)]);
        source.open();
        source.close();
        assert!(!source.is_open());
        assert_eq!(source.records().len(), 1);
        assert!(source.is_open());
    }
}
