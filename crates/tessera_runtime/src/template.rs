use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::Value;
use std::fmt;

#[derive(Parser)]
#[grammar = "template.pest"]
pub struct TemplateParser;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),

    #[error("'{path}' is not present in the payload")]
    MissingValue { path: String },

    #[error("unexpected template rule: {0:?}")]
    UnexpectedRule(Rule),
}

impl From<pest::error::Error<Rule>> for TemplateError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        TemplateError::Parse(err.to_string())
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Field(String),
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Data(Vec<Accessor>),
}

/// A parsed action parameter, e.g. `"@data.speed@ km/h"`.
///
/// Only two tokens exist: `@data` followed by a property path, and `@` as a
/// concatenation boundary. Nothing is ever executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    pub fn parse(source: &str) -> TemplateResult<Template> {
        let mut pairs = TemplateParser::parse(Rule::template, source)?;
        let root = pairs
            .next()
            .ok_or_else(|| TemplateError::Parse("empty template".to_string()))?;
        let mut parts: Vec<TemplatePart> = Vec::new();
        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::literal => match parts.last_mut() {
                    Some(TemplatePart::Literal(text)) => text.push_str(pair.as_str()),
                    _ => parts.push(TemplatePart::Literal(pair.as_str().to_string())),
                },
                Rule::data_ref => parts.push(TemplatePart::Data(parse_accessors(pair)?)),
                Rule::boundary | Rule::EOI => {}
                other => return Err(TemplateError::UnexpectedRule(other)),
            }
        }
        Ok(Template { parts })
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Renders against the payload, failing on the first missing value.
    pub fn render(&self, data: &Value) -> TemplateResult<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Data(path) => {
                    let value = resolve(data, path).ok_or_else(|| TemplateError::MissingValue {
                        path: describe(path),
                    })?;
                    out.push_str(&display_value(&value));
                }
            }
        }
        Ok(out)
    }

    /// Renders missing values as empty text and reports the first of them.
    pub fn render_lossy(&self, data: &Value) -> (String, Option<TemplateError>) {
        let mut out = String::new();
        let mut first_error = None;
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Data(path) => match resolve(data, path) {
                    Some(value) => out.push_str(&display_value(&value)),
                    None => {
                        first_error.get_or_insert(TemplateError::MissingValue { path: describe(path) });
                    }
                },
            }
        }
        (out, first_error)
    }
}

fn parse_accessors(pair: Pair<Rule>) -> TemplateResult<Vec<Accessor>> {
    let mut accessors = Vec::new();
    for inner in pair.into_inner() {
        let accessor = match inner.as_rule() {
            Rule::field => Accessor::Field(inner_text(inner)),
            Rule::key => Accessor::Key(inner_text(inner)),
            Rule::index => {
                let digits = inner_text(inner);
                let index = digits
                    .parse::<usize>()
                    .map_err(|e| TemplateError::Parse(format!("bad index '{digits}': {e}")))?;
                Accessor::Index(index)
            }
            other => return Err(TemplateError::UnexpectedRule(other)),
        };
        accessors.push(accessor);
    }
    Ok(accessors)
}

fn inner_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn resolve(data: &Value, path: &[Accessor]) -> Option<Value> {
    let mut current = data;
    for (i, accessor) in path.iter().enumerate() {
        current = match (accessor, current) {
            (Accessor::Field(name) | Accessor::Key(name), Value::Object(map)) => map.get(name)?,
            (Accessor::Index(index), Value::Array(items)) => items.get(*index)?,
            (Accessor::Key(k), Value::Array(items)) => items.get(k.parse::<usize>().ok()?)?,
            (Accessor::Field(name), Value::Array(items)) if name == "length" && i + 1 == path.len() => {
                return Some(Value::from(items.len()));
            }
            (Accessor::Field(name), Value::String(s)) if name == "length" && i + 1 == path.len() => {
                return Some(Value::from(s.chars().count()));
            }
            _ => return None,
        };
    }
    Some(current.clone())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn describe(path: &[Accessor]) -> String {
    let mut out = String::from("data");
    for accessor in path {
        match accessor {
            Accessor::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            Accessor::Key(key) => out.push_str(&format!("['{key}']")),
            Accessor::Index(index) => out.push_str(&format!("[{index}]")),
        }
    }
    out
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => f.write_str(text)?,
                TemplatePart::Data(path) => write!(f, "@{}@", describe(path))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_a_field_between_markers() {
        let template = Template::parse("@data.speed@ km/h").unwrap();
        assert_eq!(template.render(&json!({"speed": 42})).unwrap(), "42 km/h");
    }

    #[test]
    fn bare_data_renders_the_whole_payload() {
        let template = Template::parse("value=@data").unwrap();
        assert_eq!(template.render(&json!("abc")).unwrap(), "value=abc");
        assert_eq!(template.render(&json!({"a": 1})).unwrap(), "value={\"a\":1}");
    }

    #[test]
    fn lone_markers_are_boundaries() {
        let template = Template::parse("a@b@@c").unwrap();
        assert_eq!(template.render(&json!(null)).unwrap(), "abc");
    }

    #[test]
    fn indexes_and_quoted_keys() {
        let template = Template::parse("@data.rows[1]['road name']@/@data.rows.length@").unwrap();
        let data = json!({"rows": [{"road name": "A1"}, {"road name": "B7"}]});
        assert_eq!(template.render(&data).unwrap(), "B7/2");
    }

    #[test]
    fn identifiers_starting_with_data_are_literal() {
        let template = Template::parse("@database").unwrap();
        assert_eq!(template.render(&json!(1)).unwrap(), "database");
    }

    #[test]
    fn missing_values_are_reported() {
        let template = Template::parse("@data.nope@!").unwrap();
        assert_eq!(
            template.render(&json!({})),
            Err(TemplateError::MissingValue { path: "data.nope".into() })
        );
        let (text, err) = template.render_lossy(&json!({}));
        assert_eq!(text, "!");
        assert!(err.is_some());
    }

    #[test]
    fn no_code_is_evaluated() {
        let template = Template::parse("\"+alert(1)+\"").unwrap();
        assert_eq!(template.render(&json!(0)).unwrap(), "\"+alert(1)+\"");
    }
}
