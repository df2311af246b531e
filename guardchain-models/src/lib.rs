//! # guardchain-models
//!
//! Chat and completion model clients for guardchain.
//!
//! This crate defines the two model trait surfaces guarded chains are
//! built against, plus implementations:
//!
//! - **[`ChatModel`]** / **[`CompletionModel`]**: the async traits
//! - **[`OpenAiChatModel`]** / **[`OpenAiCompletionModel`]**:
//!   OpenAI-compatible HTTP clients over reqwest
//! - **[`MockChatModel`]**, **[`ScriptedChatModel`]**, and their
//!   completion twins: test doubles
//!
//! ## Example
//!
//! ```rust,ignore
//! use guardchain_core::{ChatMessage, ModelSettings};
//! use guardchain_models::{ChatModel, OpenAiChatModel};
//!
//! let model = OpenAiChatModel::from_env("gpt-4o-mini")?;
//! let output = model
//!     .chat(&[ChatMessage::user("Hello!")], &ModelSettings::new())
//!     .await?;
//! println!("{}", output.first_text().unwrap_or_default());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod mock;
pub mod model;
pub mod openai;

pub use config::ClientConfig;
pub use error::ModelError;
pub use mock::{
    MockChatModel, MockCompletionModel, ScriptedChatModel, ScriptedCompletionModel,
};
pub use model::{BoxedChatModel, BoxedCompletionModel, ChatModel, CompletionModel};
pub use openai::{OpenAiChatModel, OpenAiCompletionModel};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::error::ModelError;
    pub use crate::mock::{
        MockChatModel, MockCompletionModel, ScriptedChatModel, ScriptedCompletionModel,
    };
    pub use crate::model::{BoxedChatModel, BoxedCompletionModel, ChatModel, CompletionModel};
    pub use crate::openai::{OpenAiChatModel, OpenAiCompletionModel};
}
