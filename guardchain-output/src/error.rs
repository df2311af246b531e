//! Error types for output parsing and validation.

use std::fmt;
use thiserror::Error;

/// Failure to extract or parse JSON from model text.
#[derive(Debug, Error)]
pub enum OutputParseError {
    /// No JSON document could be located in the text.
    #[error("no JSON document found in model output")]
    NoJson,

    /// A candidate document was found but did not parse.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single structural violation found during schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON-path-style location of the offending value.
    pub path: String,
    /// What went wrong there.
    pub message: String,
}

impl SchemaViolation {
    /// Create a violation at the given path.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.message)
    }
}

/// Errors from the guard layer.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The output spec or task query was empty at construction.
    #[error("guard configuration error: {0}")]
    Configuration(String),

    /// Model text yielded no parseable JSON.
    #[error(transparent)]
    Parse(#[from] OutputParseError),

    /// Parsed JSON failed structural validation.
    #[error("output failed schema validation ({} violation(s))", .violations.len())]
    Validation {
        /// All violations found, in document order.
        violations: Vec<SchemaViolation>,
    },
}

impl GuardError {
    /// The validation violations, if this is a validation failure.
    #[must_use]
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Self::Validation { violations } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let v = SchemaViolation::new("$.age", "expected integer, got string");
        assert_eq!(v.to_string(), "at $.age: expected integer, got string");
    }

    #[test]
    fn test_guard_error_counts_violations() {
        let err = GuardError::Validation {
            violations: vec![
                SchemaViolation::new("$", "missing key"),
                SchemaViolation::new("$.x", "wrong type"),
            ],
        };
        assert!(err.to_string().contains("2 violation(s)"));
    }

    #[test]
    fn test_violations_accessor() {
        let err = GuardError::Parse(OutputParseError::NoJson);
        assert!(err.violations().is_empty());
    }
}
