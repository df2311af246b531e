//! Output specification types.
//!
//! An [`OutputSpec`] is the caller's description of the structure a
//! model response must have. It comes in two forms: an opaque schema
//! block that is substituted into the prompt verbatim, or a JSON-schema
//! object that is both rendered into the prompt and used to validate
//! parsed output.

use serde_json::Value as JsonValue;

/// Specification of the expected output structure.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSpec {
    /// An opaque schema description, placed in the prompt as-is.
    ///
    /// Use this when the schema is written in a prompt dialect the model
    /// understands directly (element descriptions, field lists, etc.).
    Raw(String),

    /// A JSON-schema object.
    ///
    /// Rendered into the prompt as pretty-printed JSON and used for
    /// structural validation of the parsed response.
    JsonSchema(JsonValue),
}

impl OutputSpec {
    /// Create a raw (opaque) spec.
    #[must_use]
    pub fn raw(schema: impl Into<String>) -> Self {
        Self::Raw(schema.into())
    }

    /// Create a JSON-schema spec.
    #[must_use]
    pub fn json_schema(schema: JsonValue) -> Self {
        Self::JsonSchema(schema)
    }

    /// The schema text to embed in a prompt.
    #[must_use]
    pub fn schema_block(&self) -> String {
        match self {
            Self::Raw(s) => s.trim().to_string(),
            // to_string_pretty only fails on non-string map keys, which
            // a JsonValue cannot hold.
            Self::JsonSchema(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }

    /// The JSON schema, when this spec carries one.
    #[must_use]
    pub fn as_json_schema(&self) -> Option<&JsonValue> {
        match self {
            Self::JsonSchema(v) => Some(v),
            Self::Raw(_) => None,
        }
    }

    /// Check whether the spec carries no schema content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Raw(s) => s.trim().is_empty(),
            Self::JsonSchema(v) => v.is_null(),
        }
    }
}

impl From<&str> for OutputSpec {
    fn from(s: &str) -> Self {
        Self::raw(s)
    }
}

impl From<String> for OutputSpec {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

impl From<JsonValue> for OutputSpec {
    fn from(v: JsonValue) -> Self {
        Self::JsonSchema(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_raw_spec_block_is_verbatim() {
        let spec = OutputSpec::raw("  <object name=\"person\"/>  ");
        assert_eq!(spec.schema_block(), "<object name=\"person\"/>");
        assert!(spec.as_json_schema().is_none());
    }

    #[test]
    fn test_json_schema_block_is_pretty() {
        let spec = OutputSpec::json_schema(json!({"type": "object"}));
        let block = spec.schema_block();
        assert!(block.contains("\"type\": \"object\""));
        assert!(spec.as_json_schema().is_some());
    }

    #[test]
    fn test_is_empty() {
        assert!(OutputSpec::raw("   ").is_empty());
        assert!(OutputSpec::json_schema(JsonValue::Null).is_empty());
        assert!(!OutputSpec::raw("<string name=\"x\"/>").is_empty());
    }

    #[test]
    fn test_from_conversions() {
        let spec: OutputSpec = "<object/>".into();
        assert!(matches!(spec, OutputSpec::Raw(_)));

        let spec: OutputSpec = json!({"type": "string"}).into();
        assert!(matches!(spec, OutputSpec::JsonSchema(_)));
    }
}
