use thiserror::Error;

/// Fatal errors raised while loading a report definition or preparing it.
///
/// Per the failure taxonomy: configuration errors abort preparation;
/// expression/data/geometry problems are recoverable and never surface
/// here (see [`crate::prepared::PreparedText::error`]).
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("band '{0}' references unknown band '{1}'")]
    UnknownBandReference(String, String),

    #[error("data band '{0}' specifies both a row_count and a dataSource")]
    AmbiguousDataBandSource(String),

    #[error("group header '{0}' has neither an expression nor a field")]
    MissingGroupExpression(String),

    #[error("page already has a {0}")]
    DuplicateSingletonBand(&'static str),

    #[error("group footer '{0}' does not reference a group header")]
    OrphanGroupFooter(String),

    #[error("group header '{0}' does not reference a data band")]
    OrphanGroupHeader(String),

    #[error("unknown data source '{0}'")]
    UnknownDataSource(String),

    #[error("unknown page '{0}' referenced by subreport")]
    UnknownSubreportPage(String),

    #[error("expression error: {0}")]
    Expression(#[from] crate::expr::ExprError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
