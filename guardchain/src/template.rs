//! Prompt templates with `{{variable}}` placeholders.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::TemplateError;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// A prompt template with `{{variable}}` placeholders.
///
/// Variables are discovered at construction and exposed in
/// first-appearance order; formatting substitutes every occurrence.
///
/// # Example
///
/// ```rust
/// use guardchain::PromptTemplate;
/// use indexmap::IndexMap;
///
/// let template = PromptTemplate::new("Summarize {{notes}} for {{audience}}.");
/// assert_eq!(template.input_variables(), ["notes", "audience"]);
///
/// let mut values = IndexMap::new();
/// values.insert("notes".to_string(), "the meeting".to_string());
/// values.insert("audience".to_string(), "executives".to_string());
/// assert_eq!(
///     template.format(&values).unwrap(),
///     "Summarize the meeting for executives."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a template, scanning it for placeholders.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut input_variables: Vec<String> = Vec::new();
        for captures in placeholder_regex().captures_iter(&template) {
            let name = captures[1].to_string();
            if !input_variables.contains(&name) {
                input_variables.push(name);
            }
        }
        Self {
            template,
            input_variables,
        }
    }

    /// The raw template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in first-appearance order.
    #[must_use]
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute every placeholder from the given values.
    ///
    /// Extra entries in `values` are ignored.
    ///
    /// # Errors
    ///
    /// [`TemplateError::MissingVariable`] when a placeholder has no
    /// value.
    pub fn format(
        &self,
        values: &IndexMap<String, String>,
    ) -> Result<String, TemplateError> {
        for name in &self.input_variables {
            if !values.contains_key(name) {
                return Err(TemplateError::MissingVariable(name.clone()));
            }
        }

        let formatted = placeholder_regex().replace_all(&self.template, |captures: &regex::Captures<'_>| {
            // Presence was checked above; placeholders not in
            // input_variables cannot match here.
            values
                .get(&captures[1])
                .cloned()
                .unwrap_or_default()
        });
        Ok(formatted.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_variables_in_order() {
        let template = PromptTemplate::new("{{b}} then {{a}} then {{b}} again");
        assert_eq!(template.input_variables(), ["b", "a"]);
    }

    #[test]
    fn test_format_substitutes_all_occurrences() {
        let template = PromptTemplate::new("{{x}} and {{x}}");
        let result = template.format(&values(&[("x", "42")])).unwrap();
        assert_eq!(result, "42 and 42");
    }

    #[test]
    fn test_format_with_whitespace_in_placeholder() {
        let template = PromptTemplate::new("Hello {{ name }}!");
        assert_eq!(template.input_variables(), ["name"]);
        let result = template.format(&values(&[("name", "Ada")])).unwrap();
        assert_eq!(result, "Hello Ada!");
    }

    #[test]
    fn test_missing_variable() {
        let template = PromptTemplate::new("Hello {{name}}!");
        let err = template.format(&values(&[])).unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable("name".to_string()));
    }

    #[test]
    fn test_extra_values_ignored() {
        let template = PromptTemplate::new("No placeholders here.");
        assert!(template.input_variables().is_empty());
        let result = template.format(&values(&[("unused", "x")])).unwrap();
        assert_eq!(result, "No placeholders here.");
    }

    #[test]
    fn test_single_braces_untouched() {
        let template = PromptTemplate::new("JSON like {\"a\": 1} and {{var}}");
        assert_eq!(template.input_variables(), ["var"]);
        let result = template.format(&values(&[("var", "ok")])).unwrap();
        assert_eq!(result, "JSON like {\"a\": 1} and ok");
    }
}
