//! The duck-typed value carried through expression evaluation.
//!
//! Grounded on `templates::TemplateValue`, generalized to a fuller sum
//! type: null, bool, integer, float, decimal, date, datetime, string,
//! bytes, list, map, and an opaque record handle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Anything that can be addressed both by `record["id"]` and `record.id`.
///
/// Two blanket-ish implementations cover the shapes seen in practice: a
/// plain string-keyed map, and anything that knows how to look itself up
/// by field name (a "struct-like" record). Both forward to the same
/// lookup so the expression evaluator never has to special-case either.
pub trait Record: fmt::Debug + Send + Sync {
    fn field(&self, name: &str) -> Option<Value>;
    fn field_names(&self) -> Vec<String>;
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    String(String),
    Bytes(Arc<[u8]>),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// An opaque handle to a data source record (dict- or struct-like).
    Record(Arc<dyn Record>),
}

impl Value {
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            _ => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => d.to_string().parse().ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Lookup by field/key, dispatching on the underlying shape. Both
    /// `record["id"]` and `record.id` access styles resolve through here.
    ///
    /// A `List` forwards to its first element's field, matching the
    /// data source proxy's single-field access convention
    /// (`ds["amount"]`/`ds.amount` both read the first record).
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(m) => m.get(key).cloned(),
            Value::Record(r) => r.field(key),
            Value::List(items) => items.first().and_then(|first| first.get(key)),
            _ => None,
        }
    }

    /// Get a nested value using dot notation (`a.b.c`).
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let mut current = self.clone();
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Treat missing/null as zero, as `DataProxy::values(field)` requires
    /// for SUM/AVG over a column.
    pub fn numeric_or_zero(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            other => other.as_f64().unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            // Mirrors the original engine's Python-style bool stringification:
            // highlight conditions compare the rendered text against "True".
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M")),
            Value::String(s) => write!(f, "{s}"),
            Value::Bytes(_) => write!(f, "[bytes]"),
            Value::List(_) => write!(f, "[list]"),
            Value::Map(_) => write!(f, "[object]"),
            Value::Record(_) => write!(f, "[record]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}
