//! The chain trait: a named mapping from input variables to output text.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::ChainError;

/// Default key the chains publish their text under.
pub const DEFAULT_OUTPUT_KEY: &str = "text";

/// A runnable unit mapping input variables to output values.
///
/// Implementations declare which input keys they expect and which output
/// keys they produce; [`Chain::call`] is the awaited entry point and
/// [`Chain::call_sync`] the blocking one.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Keys the inputs map must provide.
    fn input_keys(&self) -> Vec<String>;

    /// Keys the output map will contain.
    fn output_keys(&self) -> Vec<String>;

    /// Run the chain.
    async fn call(
        &self,
        inputs: &IndexMap<String, String>,
    ) -> Result<IndexMap<String, String>, ChainError>;

    /// Run the chain and return its single output value.
    ///
    /// # Errors
    ///
    /// Besides [`Chain::call`] failures, errors when the chain declares
    /// no output keys or produces a map without its first declared key.
    async fn run(&self, inputs: &IndexMap<String, String>) -> Result<String, ChainError> {
        let key = self
            .output_keys()
            .into_iter()
            .next()
            .ok_or_else(|| ChainError::Runtime("chain declares no output keys".to_string()))?;
        let mut outputs = self.call(inputs).await?;
        outputs
            .shift_remove(&key)
            .ok_or_else(|| ChainError::Runtime(format!("chain produced no `{key}` output")))
    }

    /// Blocking variant of [`Chain::call`].
    ///
    /// Drives the async call on a fresh current-thread runtime. Refuses
    /// to run inside an existing async context; use [`Chain::call`]
    /// there instead.
    fn call_sync(
        &self,
        inputs: &IndexMap<String, String>,
    ) -> Result<IndexMap<String, String>, ChainError> {
        block_on_fresh_runtime(self.call(inputs))
    }

    /// Blocking variant of [`Chain::run`].
    fn run_sync(&self, inputs: &IndexMap<String, String>) -> Result<String, ChainError> {
        block_on_fresh_runtime(self.run(inputs))
    }
}

/// A chain whose prompt is compiled by a [`Guard`].
///
/// Extends [`Chain`] with the raw-text entry points the typed
/// extraction loop needs: the first ask and the corrective re-ask.
#[async_trait]
pub trait GuardedChain: Chain {
    /// The guard that compiled this chain's prompt.
    fn guard(&self) -> &guardchain_output::Guard;

    /// Run the chain and return the first generation's text.
    async fn generate(&self, inputs: &IndexMap<String, String>) -> Result<String, ChainError> {
        self.run(inputs).await
    }

    /// Re-ask after a rejected response.
    ///
    /// `previous` is the rejected model text, `correction` the guard's
    /// corrective prompt. How the two are woven into the conversation is
    /// chain-specific.
    async fn regenerate(
        &self,
        inputs: &IndexMap<String, String>,
        previous: &str,
        correction: &str,
    ) -> Result<String, ChainError>;
}

fn block_on_fresh_runtime<T>(
    future: impl std::future::Future<Output = Result<T, ChainError>>,
) -> Result<T, ChainError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ChainError::Runtime(
            "blocking entry point cannot be used from async context; use the async call instead"
                .to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ChainError::Runtime(format!("failed to create runtime: {e}")))?;
    runtime.block_on(future)
}
