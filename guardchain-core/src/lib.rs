//! # guardchain-core
//!
//! Core types shared across the guardchain workspace.
//!
//! This crate provides the foundational vocabulary the rest of the
//! workspace speaks:
//!
//! - **Messages**: [`ChatMessage`] turns sent to chat models and the
//!   [`LlmOutput`] / [`Generation`] types every model call returns
//! - **Settings**: [`ModelSettings`] generation options
//! - **Usage**: [`TokenUsage`] token accounting
//!
//! ## Example
//!
//! ```rust
//! use guardchain_core::{ChatMessage, LlmOutput, ModelSettings, TokenUsage};
//!
//! // Build a chat transcript
//! let messages = vec![
//!     ChatMessage::system("You are a helpful assistant."),
//!     ChatMessage::user("Hello!"),
//! ];
//! assert_eq!(messages[0].role.as_str(), "system");
//!
//! // Configure generation
//! let settings = ModelSettings::new().max_tokens(512).temperature(0.0);
//! assert_eq!(settings.max_tokens, Some(512));
//!
//! // A single-generation output
//! let output = LlmOutput::text("{\"ok\": true}")
//!     .with_usage(TokenUsage::with_tokens(12, 5));
//! assert_eq!(output.first_text(), Some("{\"ok\": true}"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod messages;
pub mod settings;
pub mod usage;

pub use messages::{ChatMessage, ChatRole, FinishReason, Generation, LlmOutput};
pub use settings::ModelSettings;
pub use usage::TokenUsage;

/// Prelude module for common imports.
///
/// ```rust
/// use guardchain_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::messages::{ChatMessage, ChatRole, FinishReason, Generation, LlmOutput};
    pub use crate::settings::ModelSettings;
    pub use crate::usage::TokenUsage;
}
