//! A banded report engine: declarative page/band layout driven by tabular
//! data sources, producing a paginated, geometry-resolved [`Document`]
//! ready for a rendering back-end.
//!
//! Build a [`model::Report`] (pages, bands, objects, data sources), then
//! call [`prepare`] to run the expression evaluator, data driver, grouping
//! pass, and page layouter over it. See `model` for the report definition
//! types and `prepared` for the output shape.

pub mod context;
pub mod data;
mod driver;
mod engine;
pub mod error;
pub mod expr;
pub mod graphics;
pub mod layout;
pub mod model;
pub mod prepared;
mod render;
mod subreport;
pub mod units;
pub mod value;

pub use context::Context;
pub use engine::{prepare, MeasureFn, PrepareLevel, PrepareOptions};
pub use error::{ReportError, Result};
pub use model::Report;
pub use prepared::Document;
