//! Error types for chains and typed extraction.

use guardchain_models::ModelError;
use guardchain_output::GuardError;
use thiserror::Error;

/// Failure to format a prompt template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder in the template had no value in the inputs.
    #[error("missing value for template variable `{0}`")]
    MissingVariable(String),
}

/// Errors raised when running a chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Prompt formatting failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Guard construction or parsing failed.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The model client failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model returned no generations.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Runtime misuse (e.g. blocking entry point inside async context).
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors raised by typed extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The underlying chain failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The output was rejected on every attempt.
    #[error("output rejected after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Total attempts made, including the first ask.
        attempts: u32,
        /// The failure from the final attempt.
        #[source]
        last: GuardError,
    },

    /// The validated JSON did not deserialize into the target type.
    #[error("typed deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_display() {
        let err = TemplateError::MissingVariable("notes".to_string());
        assert!(err.to_string().contains("`notes`"));
    }

    #[test]
    fn test_chain_error_from_model() {
        let err: ChainError = ModelError::api("boom").into();
        assert!(matches!(err, ChainError::Model(_)));
    }

    #[test]
    fn test_exhausted_reports_attempts() {
        let err = ExtractError::Exhausted {
            attempts: 2,
            last: GuardError::Configuration("x".into()),
        };
        assert!(err.to_string().contains("2 attempt(s)"));
    }
}
