//! Compiled placeholder templates: scanning, the two delimiter styles, and
//! rendering against an [`Environment`].
//!
//! Grounded on `templates::parser::TemplateParser` (regex placeholder scan)
//! and `templates::renderer::TemplateRenderer` (substitution + missing-name
//! handling), generalized to a full expression grammar and a second,
//! deferred delimiter per the evaluator contract.

use super::ast::{self, Ast};
use super::error::ExprResult;
use super::Environment;

/// Which delimiter style produced a given expression segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{{ … }}` — evaluated immediately during band processing.
    Primary,
    /// `${ … }` — evaluated only once `page_count` (and similar
    /// end-of-preparation values) are known.
    Secondary,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Expr {
        delimiter: Delimiter,
        source: String,
        ast: Ast,
    },
}

/// Controls which delimiter styles get evaluated on a given render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Evaluate every segment.
    All,
    /// Evaluate only `{{ }}` segments; `${ }` segments are re-emitted
    /// verbatim as `${ source }` so a second, deferred pass can find them.
    PrimaryOnly,
}

/// A parsed template ready to render against repeated contexts.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, recognising both `{{ }}` and `${ }` placeholders.
    pub fn compile(source: &str) -> ExprResult<Template> {
        let mut segments = Vec::new();
        let mut rest = source;

        loop {
            let primary_pos = rest.find("{{");
            let secondary_pos = rest.find("${");

            let next = match (primary_pos, secondary_pos) {
                (None, None) => None,
                (Some(p), None) => Some((p, Delimiter::Primary)),
                (None, Some(s)) => Some((s, Delimiter::Secondary)),
                (Some(p), Some(s)) => {
                    if p <= s {
                        Some((p, Delimiter::Primary))
                    } else {
                        Some((s, Delimiter::Secondary))
                    }
                }
            };

            let Some((start, delimiter)) = next else {
                if !rest.is_empty() {
                    segments.push(Segment::Literal(rest.to_string()));
                }
                break;
            };

            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let (open_len, close) = match delimiter {
                Delimiter::Primary => (2, "}}"),
                Delimiter::Secondary => (2, "}"),
            };

            let body_start = start + open_len;
            let body = &rest[body_start..];
            let close_pos = body.find(close).ok_or_else(|| {
                super::error::ExprError::UnterminatedDelimiter(rest[start..].to_string())
            })?;

            let inner = body[..close_pos].trim();
            let ast = ast::parse(inner)?;
            segments.push(Segment::Expr {
                delimiter,
                source: inner.to_string(),
                ast,
            });

            rest = &body[close_pos + close.len()..];
            if rest.is_empty() {
                break;
            }
        }

        Ok(Template { segments })
    }

    /// True if this template has no `{{ }}`/`${ }` segments at all.
    pub fn is_literal(&self) -> bool {
        !self.segments.iter().any(|s| matches!(s, Segment::Expr { .. }))
    }

    /// Render against `env`. Returns the rendered text and whether any
    /// segment failed to evaluate (missing name, helper error, type
    /// error) — such segments are replaced with `error_placeholder` and
    /// rendering continues for the remaining segments.
    pub fn render(
        &self,
        env: &dyn Environment,
        mode: RenderMode,
        error_placeholder: &str,
    ) -> (String, bool) {
        let mut out = String::new();
        let mut errored = false;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expr {
                    delimiter,
                    source,
                    ast,
                } => {
                    if mode == RenderMode::PrimaryOnly && *delimiter == Delimiter::Secondary {
                        out.push_str("${ ");
                        out.push_str(source);
                        out.push_str(" }");
                        continue;
                    }
                    match ast::eval(ast, env) {
                        Ok(value) => out.push_str(&value.to_string()),
                        Err(_) => {
                            errored = true;
                            out.push_str(error_placeholder);
                        }
                    }
                }
            }
        }

        (out, errored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::error::{ExprError, ExprResult};
    use crate::value::Value;
    use std::collections::HashMap;

    struct MapEnv(HashMap<String, Value>);

    impl Environment for MapEnv {
        fn lookup(&self, name: &str) -> Option<Value> {
            self.0.get(name).cloned()
        }

        fn call(&self, name: &str, _args: &[Value]) -> ExprResult<Value> {
            Err(ExprError::UndefinedName(name.to_string()))
        }
    }

    #[test]
    fn renders_plain_text_unchanged() {
        let template = Template::compile("hello world").unwrap();
        let env = MapEnv(HashMap::new());
        let (rendered, errored) = template.render(&env, RenderMode::All, "-");
        assert_eq!(rendered, "hello world");
        assert!(!errored);
    }

    #[test]
    fn renders_primary_placeholder() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), Value::from("Alice"));
        let env = MapEnv(map);
        let template = Template::compile("Hello {{ name }}!").unwrap();
        let (rendered, errored) = template.render(&env, RenderMode::All, "-");
        assert_eq!(rendered, "Hello Alice!");
        assert!(!errored);
    }

    #[test]
    fn primary_only_mode_leaves_secondary_verbatim() {
        let mut map = HashMap::new();
        map.insert("page_index".to_string(), Value::Integer(7));
        let env = MapEnv(map);
        let template = Template::compile("Page {{ page_index }} of ${ page_count }").unwrap();
        let (rendered, errored) = template.render(&env, RenderMode::PrimaryOnly, "-");
        assert_eq!(rendered, "Page 7 of ${ page_count }");
        assert!(!errored);
    }

    #[test]
    fn deferred_second_pass_resolves_secondary() {
        let first_pass = "Page 7 of ${ page_count }";
        let deferred = Template::compile(first_pass).unwrap();
        let mut map = HashMap::new();
        map.insert("page_count".to_string(), Value::Integer(11));
        let env = MapEnv(map);
        let (rendered, errored) = deferred.render(&env, RenderMode::All, "-");
        assert_eq!(rendered, "Page 7 of 11");
        assert!(!errored);
    }

    #[test]
    fn missing_name_yields_error_placeholder_and_continues() {
        let env = MapEnv(HashMap::new());
        let template = Template::compile("{{ missing }} and {{ 1 + 1 }}").unwrap();
        let (rendered, errored) = template.render(&env, RenderMode::All, "-");
        assert_eq!(rendered, "- and 2");
        assert!(errored);
    }

    #[test]
    fn unterminated_delimiter_is_a_compile_error() {
        assert!(Template::compile("{{ name").is_err());
    }
}
