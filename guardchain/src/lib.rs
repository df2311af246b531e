//! # guardchain - Schema-Guarded Prompt Chains for Rust
//!
//! guardchain gets schema-conforming structured output from LLM chat and
//! completion endpoints. A caller supplies a model client, a free-text
//! task query, and a schema description; guardchain compiles the
//! constrained prompt, invokes the model (awaited or blocking), and
//! hands back the model's text — or, through [`TypedExtractor`], a fully
//! validated typed value with corrective re-asks on failure.
//!
//! ## Quick Start
//!
//! ```ignore
//! use guardchain::prelude::*;
//! use indexmap::IndexMap;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = OpenAiChatModel::from_env("gpt-4o-mini")?;
//!     let chain = ChatGuardChain::new(
//!         model,
//!         "Extract the patient's information from these notes:\n\n{{doctors_notes}}",
//!         r#"{"type": "object", "required": ["age"],
//!             "properties": {"age": {"type": "integer"}}}"#
//!             .parse::<serde_json::Value>()?,
//!     )?;
//!
//!     let mut inputs = IndexMap::new();
//!     inputs.insert("doctors_notes".to_string(), "49 y/o male ...".to_string());
//!     let text = chain.run(&inputs).await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Key Pieces
//!
//! - **[`ChatGuardChain`]** - the chat-model variant: guard instructions
//!   as the system message, the compiled query as the human message
//! - **[`CompletionGuardChain`]** - the completion-model variant: one
//!   prompt string carrying the whole contract
//! - **[`PromptTemplate`]** - `{{variable}}` placeholder handling
//! - **[`TypedExtractor`]** - parse, validate, deserialize, re-ask
//!
//! ## Architecture
//!
//! guardchain is organized as a workspace of focused crates:
//!
//! - [`guardchain_core`] - messages, settings, usage
//! - [`guardchain_output`] - output specs, prompt compilation, parsing,
//!   validation (the guard layer)
//! - [`guardchain_models`] - model traits, OpenAI-compatible clients,
//!   test doubles

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod chain;
pub mod chat;
pub mod completion;
pub mod error;
pub mod extract;
pub mod template;

// ============================================================================
// Core Crate Re-exports
// ============================================================================

/// Core message, settings, and usage types.
pub use guardchain_core as core;

/// Output specs, prompt compilation, and schema validation.
pub use guardchain_output as output;

/// Model traits and client implementations.
pub use guardchain_models as models;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use chain::{Chain, GuardedChain, DEFAULT_OUTPUT_KEY};
pub use chat::ChatGuardChain;
pub use completion::CompletionGuardChain;
pub use error::{ChainError, ExtractError, TemplateError};
pub use extract::TypedExtractor;
pub use template::PromptTemplate;

pub use guardchain_core::{
    ChatMessage, ChatRole, FinishReason, Generation, LlmOutput, ModelSettings, TokenUsage,
};
pub use guardchain_models::{
    BoxedChatModel, BoxedCompletionModel, ChatModel, CompletionModel, ModelError,
    OpenAiChatModel, OpenAiCompletionModel,
};
pub use guardchain_output::{Guard, GuardError, OutputSpec, SchemaViolation};

/// Convenient prelude for common imports.
///
/// ```ignore
/// use guardchain::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chain::{Chain, GuardedChain, DEFAULT_OUTPUT_KEY};
    pub use crate::chat::ChatGuardChain;
    pub use crate::completion::CompletionGuardChain;
    pub use crate::error::{ChainError, ExtractError, TemplateError};
    pub use crate::extract::TypedExtractor;
    pub use crate::template::PromptTemplate;

    pub use guardchain_core::prelude::*;
    pub use guardchain_models::prelude::*;
    pub use guardchain_output::prelude::*;
}

/// Returns the current version of guardchain.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
        assert!(!version().is_empty());
    }
}
