//! The guard: an output spec bound to a task query.
//!
//! A [`Guard`] compiles the constrained prompt once at construction and
//! afterwards owns the response side: extracting JSON from model text,
//! validating it when the spec carries a JSON schema, and producing the
//! corrective follow-up prompt used for re-asks.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::GuardError;
use crate::parser::extract_json;
use crate::prompts::{compile_chat_prompt, compile_completion_prompt};
use crate::spec::OutputSpec;
use crate::validator::validate_schema;

/// Which prompt shape the guard compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVariant {
    /// Single prompt string for completion models.
    Completion,
    /// System instructions plus human message for chat models.
    Chat,
}

/// An output spec bound to a task query, with its compiled prompt.
#[derive(Debug, Clone)]
pub struct Guard {
    spec: OutputSpec,
    variant: GuardVariant,
    base_prompt: String,
    instructions: Option<String>,
    max_reasks: u32,
}

impl Guard {
    /// Default number of corrective re-asks.
    pub const DEFAULT_MAX_REASKS: u32 = 1;

    /// Build a guard for a completion model.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Configuration`] when the spec or query is
    /// empty.
    pub fn for_completion(
        spec: impl Into<OutputSpec>,
        query: impl Into<String>,
    ) -> Result<Self, GuardError> {
        let (spec, query) = Self::validated(spec.into(), query.into())?;
        let base_prompt = compile_completion_prompt(&spec, &query);
        Ok(Self {
            spec,
            variant: GuardVariant::Completion,
            base_prompt,
            instructions: None,
            max_reasks: Self::DEFAULT_MAX_REASKS,
        })
    }

    /// Build a guard for a chat model.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Configuration`] when the spec or query is
    /// empty.
    pub fn for_chat(
        spec: impl Into<OutputSpec>,
        query: impl Into<String>,
    ) -> Result<Self, GuardError> {
        let (spec, query) = Self::validated(spec.into(), query.into())?;
        let (instructions, base_prompt) = compile_chat_prompt(&spec, &query);
        Ok(Self {
            spec,
            variant: GuardVariant::Chat,
            base_prompt,
            instructions: Some(instructions),
            max_reasks: Self::DEFAULT_MAX_REASKS,
        })
    }

    fn validated(spec: OutputSpec, query: String) -> Result<(OutputSpec, String), GuardError> {
        if spec.is_empty() {
            return Err(GuardError::Configuration(
                "output spec is empty".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(GuardError::Configuration(
                "task query is empty".to_string(),
            ));
        }
        Ok((spec, query))
    }

    /// Set the maximum number of corrective re-asks.
    #[must_use]
    pub fn with_max_reasks(mut self, max_reasks: u32) -> Self {
        self.max_reasks = max_reasks;
        self
    }

    /// The compiled prompt template.
    ///
    /// For chat guards this is the human-message template; the system
    /// message lives in [`Guard::instructions`].
    #[must_use]
    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    /// System instructions for chat guards, `None` for completion guards.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// The prompt shape this guard compiles.
    #[must_use]
    pub fn variant(&self) -> GuardVariant {
        self.variant
    }

    /// The bound output spec.
    #[must_use]
    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Maximum corrective re-asks the extraction loop may issue.
    #[must_use]
    pub fn max_reasks(&self) -> u32 {
        self.max_reasks
    }

    /// Parse model text into a JSON value, validating it when the spec
    /// carries a JSON schema.
    ///
    /// # Errors
    ///
    /// [`GuardError::Parse`] when no JSON can be extracted,
    /// [`GuardError::Validation`] when the document does not conform.
    pub fn parse(&self, text: &str) -> Result<JsonValue, GuardError> {
        let document = extract_json(text).map_err(|e| {
            debug!(error = %e, "no JSON in model output");
            e
        })?;
        let value: JsonValue = serde_json::from_str(&document).map_err(|e| {
            GuardError::Parse(crate::error::OutputParseError::Json(e))
        })?;

        if let Some(schema) = self.spec.as_json_schema() {
            let violations = validate_schema(&value, schema);
            if !violations.is_empty() {
                debug!(count = violations.len(), "schema validation failed");
                return Err(GuardError::Validation { violations });
            }
        }
        Ok(value)
    }

    /// Build the corrective follow-up prompt for a failed response.
    ///
    /// The prompt names what went wrong and restates the schema so the
    /// model can answer again without the rest of the original context.
    #[must_use]
    pub fn reask_prompt(&self, failure: &GuardError) -> String {
        let mut prompt = String::from(
            "Your previous response did not satisfy the required output schema.\n",
        );
        match failure {
            GuardError::Validation { violations } => {
                prompt.push_str("Problems found:\n");
                for violation in violations {
                    prompt.push_str(&format!("- {violation}\n"));
                }
            }
            other => {
                prompt.push_str(&format!("Problem found:\n- {other}\n"));
            }
        }
        prompt.push_str(
            "\nRespond again with ONLY a corrected JSON document that conforms to \
             this schema:\n\n",
        );
        prompt.push_str(&self.spec.schema_block());
        prompt
    }
}
