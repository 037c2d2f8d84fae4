//! The expression evaluator: compiles `{{ }}`/`${ }` placeholders into a
//! small AST and renders them against an [`Environment`] of bound names.
//!
//! Grounded on the `templates` module, generalized from flat string
//! substitution into a full grammar. The evaluator is not a singleton:
//! each [`crate::context::Context`] implements [`Environment`] itself and
//! is constructed fresh per preparation job.

mod ast;
pub mod error;
mod helpers;
mod template;

pub use error::{ExprError, ExprResult};
pub use template::{Delimiter, RenderMode, Template};

use crate::value::Value;

/// The binding of names (and helper calls) an expression evaluates against.
///
/// Implemented by [`crate::context::Context`]; kept as a trait so the
/// parser/evaluator in this module never depends on the concrete context
/// type.
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<Value>;
    fn call(&self, name: &str, args: &[Value]) -> ExprResult<Value>;
}

/// Dispatch a call to one of the reserved built-in helpers. Implementors
/// of [`Environment::call`] should fall back to this after checking for
/// any locally-registered helpers of their own.
pub fn call_builtin(name: &str, args: &[Value]) -> ExprResult<Value> {
    match name {
        "SUM" | "sum" => helpers::sum(args),
        "COUNT" | "count" => helpers::count(args),
        "AVG" | "avg" => helpers::avg(args),
        "total" => helpers::total(args),
        "str" => helpers::str_helper(args),
        "format_number" => helpers::format_number(args),
        "format_mask" => helpers::format_mask(args),
        "display_format" => helpers::display_format(args),
        other => Err(ExprError::UndefinedName(other.to_string())),
    }
}
