//! # guardchain-output
//!
//! Output specs, prompt compilation, and schema validation for
//! guardchain.
//!
//! This crate owns the "guard" side of a guarded chain: it turns a
//! caller-supplied schema description into a constrained prompt, pulls
//! JSON out of whatever the model actually returned, checks it against
//! the schema, and phrases the corrective re-ask when it doesn't
//! conform.
//!
//! ## Core Concepts
//!
//! - **[`OutputSpec`]**: the schema description — an opaque block or a
//!   JSON-schema object
//! - **[`Guard`]**: a spec bound to a task query, with the compiled
//!   prompt, `parse`, and `reask_prompt`
//! - **[`parser`]**: tolerant JSON extraction from raw model text
//! - **[`validator`]**: structural validation collecting all violations
//!
//! ## Example
//!
//! ```rust
//! use guardchain_output::{Guard, OutputSpec};
//! use serde_json::json;
//!
//! let spec = OutputSpec::json_schema(json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {"name": {"type": "string"}}
//! }));
//! let guard = Guard::for_chat(spec, "Extract the person from {{notes}}.").unwrap();
//!
//! assert!(guard.base_prompt().contains("{{notes}}"));
//! let value = guard.parse("```json\n{\"name\": \"Ada\"}\n```").unwrap();
//! assert_eq!(value["name"], "Ada");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod guard;
pub mod parser;
pub mod prompts;
pub mod spec;
pub mod validator;

pub use error::{GuardError, OutputParseError, SchemaViolation};
pub use guard::{Guard, GuardVariant};
pub use parser::{contains_json, extract_json, parse_json};
pub use prompts::{COMPLETE_JSON_SUFFIX, JSON_AGENT_INSTRUCTIONS, SCHEMA_PREAMBLE};
pub use spec::OutputSpec;
pub use validator::validate_schema;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::error::{GuardError, OutputParseError, SchemaViolation};
    pub use crate::guard::{Guard, GuardVariant};
    pub use crate::parser::{extract_json, parse_json};
    pub use crate::spec::OutputSpec;
    pub use crate::validator::validate_schema;
}
