//! Structured extraction over a completion (non-chat) model.
//!
//! The completion-model variant: the whole contract — query, schema
//! block, JSON-only suffix — travels in one prompt string. The chain
//! returns the model's raw text; the guard parses it afterwards.
//!
//! Run with:
//! ```bash
//! OPENAI_API_KEY=your-key cargo run --bin completion_extract -p guardchain-demos
//! ```

use guardchain::prelude::*;
use indexmap::IndexMap;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const QUERY: &str = "Given the following doctor's notes about a patient, \
please extract a dictionary that contains the patient's information.\n\n\
{{doctors_notes}}";

const NOTES: &str = "49 y/o Male with chronic macular rash to face & hair, \
worse in beard, eyebrows & nares. Itchy, flaky, slightly scaly. Moderate \
response to OTC steroid cream";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = json!({
        "type": "object",
        "required": ["gender", "age"],
        "properties": {
            "gender": {"type": "string"},
            "age": {"type": "integer"}
        }
    });

    let model = OpenAiCompletionModel::from_env("gpt-3.5-turbo-instruct")?;
    let chain = CompletionGuardChain::new(model, QUERY, schema)?
        .with_settings(ModelSettings::new().temperature(0.0).max_tokens(512));

    let mut inputs = IndexMap::new();
    inputs.insert("doctors_notes".to_string(), NOTES.to_string());

    let text = chain.run(&inputs).await?;
    println!("raw model output:\n{text}\n");

    let value = chain.guard().parse(&text)?;
    println!("validated JSON:\n{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
