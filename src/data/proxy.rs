use crate::value::{Record, Value};
use rust_decimal::Decimal;

/// Aggregate-access wrapper over a data source's full record list.
///
/// Grounded 1:1 on original_source's `DataProxy`: `values(field)` returns
/// the per-record field values with missing/falsy entries substituted
/// with zero (used by `SUM`/`AVG`); single-field access (`field`/`get`)
/// returns the first record's field, matching `DataProxy.__getattr__`/
/// `__getitem__`. Bound into the evaluation context under the data
/// source's name as `Value::List(records)`; the expression evaluator's
/// `.values(...)` method-call and `.get(field)` fallback on `Value::List`
/// implement the same duck typing directly on `Value` (see
/// `expr::ast::eval_method_call`), so this struct is the ergonomic
/// Rust-facing counterpart used by driver code outside expressions
/// (e.g. building a `group` binding for `total()`).
#[derive(Debug, Clone)]
pub struct DataProxy {
    records: Vec<Value>,
}

impl DataProxy {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Per-record values for `field`, substituting `Decimal(0.00)` for
    /// any missing or falsy entry.
    pub fn values(&self, field: &str) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| {
                let value = record.get(field).unwrap_or(Value::Null);
                if value.as_bool() {
                    value
                } else {
                    Value::Decimal(Decimal::ZERO)
                }
            })
            .collect()
    }

    /// The first record's field, or `None` if there are no records.
    pub fn first_field(&self, field: &str) -> Option<Value> {
        self.records.first().and_then(|r| r.get(field))
    }

    pub fn into_value(self) -> Value {
        Value::List(self.records)
    }
}

impl Record for DataProxy {
    fn field(&self, name: &str) -> Option<Value> {
        self.first_field(name)
    }

    fn field_names(&self) -> Vec<String> {
        match self.records.first() {
            Some(Value::Map(m)) => m.keys().cloned().collect(),
            Some(Value::Record(r)) => r.field_names(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(amount: Option<f64>) -> Value {
        let mut map = HashMap::new();
        if let Some(a) = amount {
            map.insert("amount".to_string(), Value::Float(a));
        }
        Value::Map(map)
    }

    #[test]
    fn values_substitutes_zero_for_missing() {
        let proxy = DataProxy::new(vec![record(Some(10.0)), record(None), record(Some(0.0))]);
        let values = proxy.values("amount");
        assert_eq!(values[0].to_string(), "10");
        assert_eq!(values[1].to_string(), "0");
        assert_eq!(values[2].to_string(), "0");
    }

    #[test]
    fn first_field_reads_first_record() {
        let proxy = DataProxy::new(vec![record(Some(5.0)), record(Some(99.0))]);
        assert_eq!(proxy.first_field("amount").unwrap().to_string(), "5");
    }

    #[test]
    fn empty_proxy_has_no_first_field() {
        let proxy = DataProxy::new(vec![]);
        assert!(proxy.first_field("amount").is_none());
    }
}
