//! Typed extraction with corrective re-asks.
//!
//! A [`TypedExtractor`] wraps a [`GuardedChain`]: it runs the chain,
//! parses and validates the text through the chain's guard, and
//! deserializes the result into a typed value. When the model's output
//! is rejected, the guard's corrective prompt is sent back, up to
//! [`Guard::max_reasks`](guardchain_output::Guard::max_reasks) times.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::chain::GuardedChain;
use crate::error::ExtractError;

/// Runs a guarded chain until its output deserializes into `T`.
///
/// # Example
///
/// ```rust,ignore
/// use guardchain::{ChatGuardChain, TypedExtractor};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Patient {
///     age: u32,
/// }
///
/// let chain = ChatGuardChain::new(model, query, json!({
///     "type": "object",
///     "required": ["age"],
///     "properties": {"age": {"type": "integer"}}
/// }))?
/// .with_max_reasks(2);
///
/// let extractor: TypedExtractor<_, Patient> = TypedExtractor::new(chain);
/// let patient = extractor.extract(&inputs).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TypedExtractor<C, T> {
    chain: C,
    _marker: PhantomData<fn() -> T>,
}

impl<C, T> TypedExtractor<C, T>
where
    C: GuardedChain,
    T: DeserializeOwned,
{
    /// Wrap a guarded chain.
    #[must_use]
    pub fn new(chain: C) -> Self {
        Self {
            chain,
            _marker: PhantomData,
        }
    }

    /// The wrapped chain.
    #[must_use]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Run the chain and return the typed result.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Chain`] when the chain or model fails
    /// - [`ExtractError::Exhausted`] when every attempt was rejected
    /// - [`ExtractError::Deserialize`] when validated JSON does not fit `T`
    pub async fn extract(&self, inputs: &IndexMap<String, String>) -> Result<T, ExtractError> {
        let max_reasks = self.chain.guard().max_reasks();
        let mut text = self.chain.generate(inputs).await?;
        let mut reasks = 0u32;

        loop {
            match self.chain.guard().parse(&text) {
                Ok(value) => {
                    debug!(reasks, "output accepted");
                    return serde_json::from_value(value).map_err(ExtractError::Deserialize);
                }
                Err(failure) if reasks < max_reasks => {
                    reasks += 1;
                    warn!(attempt = reasks, error = %failure, "output rejected, re-asking");
                    let correction = self.chain.guard().reask_prompt(&failure);
                    text = self.chain.regenerate(inputs, &text, &correction).await?;
                }
                Err(failure) => {
                    return Err(ExtractError::Exhausted {
                        attempts: reasks + 1,
                        last: failure,
                    });
                }
            }
        }
    }
}
