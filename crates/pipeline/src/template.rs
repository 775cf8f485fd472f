//! Named-field prompt templates.
//!
//! A template is parsed once into literal and field segments. Rendering walks
//! the segments a single time and appends field values as opaque text, so a
//! value that itself contains `{query}` or `{text}` is never expanded.

use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed template with `{name}` placeholders.
///
/// Placeholder names are lowercase ASCII letters and underscores. A `}` with
/// no matching `{` is literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `source` into a template.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if a placeholder is unterminated or
    /// its name is empty or contains characters outside `[a-z_]`.
    pub fn parse(source: &str) -> Result<Self, PipelineError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                PipelineError::configuration("prompt template has an unterminated placeholder")
            })?;
            let name = &after[..close];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
                return Err(PipelineError::configuration(format!(
                    "prompt template placeholder '{{{name}}}' is not a valid field name"
                )));
            }
            segments.push(Segment::Field(name.to_owned()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder with the value of the same-named field.
    ///
    /// Fields not referenced by the template are ignored.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if a placeholder has no value in `fields`.
    pub fn render(&self, fields: &[(&str, &str)]) -> Result<String, PipelineError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = fields
                        .iter()
                        .find(|(key, _)| *key == name.as_str())
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            PipelineError::configuration(format!(
                                "no value supplied for prompt field '{name}'"
                            ))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_named_fields() {
        let template = PromptTemplate::parse("Summary:\n{summary}\nQuestion: {query}").unwrap();
        let rendered = template
            .render(&[("query", "why?"), ("summary", "- a\n- b")])
            .unwrap();
        assert_eq!(rendered, "Summary:\n- a\n- b\nQuestion: why?");
        assert_eq!(template.fields().collect::<Vec<_>>(), ["summary", "query"]);
    }

    #[test]
    fn substituted_values_are_not_reexpanded() {
        let template = PromptTemplate::parse("A {text} B {query}").unwrap();
        let rendered = template
            .render(&[("text", "{query}"), ("query", "{text}")])
            .unwrap();
        assert_eq!(rendered, "A {query} B {text}");
    }

    #[test]
    fn missing_field_is_a_configuration_error() {
        let template = PromptTemplate::parse("{answer}").unwrap();
        let err = template.render(&[("text", "x")]).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn rejects_malformed_placeholders() {
        assert!(PromptTemplate::parse("open {query").is_err());
        assert!(PromptTemplate::parse("empty {}").is_err());
        assert!(PromptTemplate::parse("bad {Query Text}").is_err());
    }

    #[test]
    fn stray_closing_brace_is_literal() {
        let template = PromptTemplate::parse("a } b").unwrap();
        assert_eq!(template.render(&[]).unwrap(), "a } b");
        assert_eq!(template.fields().count(), 0);
    }
}
