//! The mutable name→value scope expressions evaluate against.
//!
//! Grounded on `templates::context::TemplateContext`, generalized from a
//! flat `HashMap<String, TemplateValue>` to the reserved-key scope the
//! preparation engine seeds: `report`, `page_index`, `page_count`,
//! `date`, `time`, `params`, plus the per-record bindings
//! (`record`, `row`, `line`, `even`, `odd`, `group`) a data band/group
//! header adds while it is processing, and one binding per data source
//! name. A fresh `Context` is built for every `prepare()` call; it is
//! never a singleton, matching the original's per-report `_context` dict.

use std::collections::HashMap;
use std::sync::Arc;

use crate::expr::{call_builtin, Environment, ExprResult};
use crate::value::Value;

type CustomHelper = Arc<dyn Fn(&[Value]) -> ExprResult<Value> + Send + Sync>;

/// A preparation-job-scoped evaluation context.
///
/// Holds one flat namespace of bindings (reserved keys and free-form
/// names alike) plus a registry of helper functions available to calls
/// inside expressions. Constructed once per `prepare()` invocation.
#[derive(Clone)]
pub struct Context {
    bindings: HashMap<String, Value>,
    custom_helpers: HashMap<String, CustomHelper>,
}

impl Context {
    /// An empty context with no bindings and only the built-in helpers
    /// (`SUM`, `COUNT`, `AVG`, `total`, `str`, `format_number`,
    /// `format_mask`, `display_format`).
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            custom_helpers: HashMap::new(),
        }
    }

    /// Seed the reserved identifiers a `Report::prepare()` call sets up
    /// before processing the first page: `page_index`, `page_count`,
    /// `report`, `date`, `time`, `params`.
    pub fn seed_report(
        &mut self,
        report_name: impl Into<String>,
        date: Value,
        time: Value,
        params: HashMap<String, Value>,
    ) -> &mut Self {
        self.set("page_index", Value::Integer(0));
        self.set("page_count", Value::Integer(0));
        self.set("report", Value::String(report_name.into()));
        self.set("date", date);
        self.set("time", time);
        self.set("params", Value::Map(params));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.bindings.insert(key.into(), value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.bindings.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Bind the per-record identifiers a data band sets while processing
    /// one row: `record`, `row`, `line` (1-based row number), `even`/
    /// `odd` (alternation flags for zebra striping).
    pub fn bind_record(&mut self, record: Value, line: i64) -> &mut Self {
        self.set("record", record);
        self.set("row", Value::Integer(line));
        self.set("line", Value::Integer(line));
        self.set("even", Value::Bool(line % 2 == 0));
        self.set("odd", Value::Bool(line % 2 != 0));
        self
    }

    /// Bind `group` to the run of records sharing the current group
    /// header's expression value, for `total()`-style aggregation.
    pub fn bind_group(&mut self, records: Vec<Value>) -> &mut Self {
        self.set("group", Value::List(records));
        self
    }

    /// Register an additional helper callable from expressions, without
    /// shadowing the reserved built-ins.
    pub fn register_helper<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> ExprResult<Value> + Send + Sync + 'static,
    {
        self.custom_helpers.insert(name.into(), Arc::new(f));
        self
    }

    pub fn set_page_index(&mut self, index: i64) -> &mut Self {
        self.set("page_index", Value::Integer(index))
    }

    pub fn set_page_count(&mut self, count: i64) -> &mut Self {
        self.set("page_count", Value::Integer(count))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Context {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    fn call(&self, name: &str, args: &[Value]) -> ExprResult<Value> {
        if let Some(helper) = self.custom_helpers.get(name) {
            return helper(args);
        }
        call_builtin(name, args)
    }
}
