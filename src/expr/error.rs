use std::fmt;

/// Errors raised while compiling or evaluating an expression template.
///
/// These never escape into the prepared document: the engine always
/// catches them at the object boundary and substitutes the configured
/// error placeholder (default `"-"`), per the evaluation failure
/// semantics. The type still exists so callers that compile templates
/// ahead of time (report loading) can surface configuration-time syntax
/// mistakes as fatal errors.
#[derive(Debug, Clone)]
pub enum ExprError {
    /// Unbalanced or malformed delimiter, e.g. `{{name` with no closing brace.
    UnterminatedDelimiter(String),
    /// A name used in the expression is not bound in the context.
    UndefinedName(String),
    /// A helper was called with an unsupported arity or argument type.
    HelperError(String, String),
    /// An operator was applied to incompatible operand types.
    TypeError(String),
    /// The parser could not make sense of the expression body.
    SyntaxError(String),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedDelimiter(s) => write!(f, "unterminated delimiter in '{s}'"),
            Self::UndefinedName(name) => write!(f, "undefined name '{name}'"),
            Self::HelperError(name, msg) => write!(f, "helper '{name}' failed: {msg}"),
            Self::TypeError(msg) => write!(f, "type error: {msg}"),
            Self::SyntaxError(msg) => write!(f, "syntax error: {msg}"),
        }
    }
}

impl std::error::Error for ExprError {}

pub type ExprResult<T> = std::result::Result<T, ExprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_readable_messages() {
        let err = ExprError::UndefinedName("record".to_string());
        assert_eq!(err.to_string(), "undefined name 'record'");
    }
}
