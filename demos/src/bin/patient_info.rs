//! Extract structured patient information from doctor's notes.
//!
//! The chat-model variant: guard instructions travel as the system
//! message, the notes are substituted into the human message, and the
//! typed extractor re-asks when the response fails validation.
//!
//! Run with:
//! ```bash
//! OPENAI_API_KEY=your-key cargo run --bin patient_info -p guardchain-demos
//! ```

use guardchain::prelude::*;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct PatientInfo {
    gender: String,
    age: u32,
    symptoms: Vec<Symptom>,
    current_meds: Vec<Medication>,
}

#[derive(Debug, Deserialize)]
struct Symptom {
    symptom: String,
    affected_area: String,
}

#[derive(Debug, Deserialize)]
struct Medication {
    medication: String,
    response: String,
}

const QUERY: &str = "Given the following doctor's notes about a patient, \
please extract a dictionary that contains the patient's information.\n\n\
{{doctors_notes}}";

const NOTES: &str = "49 y/o Male with chronic macular rash to face & hair, \
worse in beard, eyebrows & nares. Itchy, flaky, slightly scaly. Moderate \
response to OTC steroid cream";

fn output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["gender", "age", "symptoms", "current_meds"],
        "properties": {
            "gender": {"type": "string", "description": "Patient's gender"},
            "age": {"type": "integer"},
            "symptoms": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["symptom", "affected_area"],
                    "properties": {
                        "symptom": {
                            "type": "string",
                            "description": "Symptom the patient is experiencing"
                        },
                        "affected_area": {
                            "type": "string",
                            "enum": ["head", "neck", "chest"]
                        }
                    }
                }
            },
            "current_meds": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["medication", "response"],
                    "properties": {
                        "medication": {"type": "string"},
                        "response": {
                            "type": "string",
                            "description": "How the patient responds to the medication"
                        }
                    }
                }
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = OpenAiChatModel::from_env("gpt-4o-mini")?;
    let chain = ChatGuardChain::new(model, QUERY, output_schema())?
        .with_settings(ModelSettings::new().temperature(0.0))
        .with_max_reasks(2);

    let mut inputs = IndexMap::new();
    inputs.insert("doctors_notes".to_string(), NOTES.to_string());

    let extractor: TypedExtractor<_, PatientInfo> = TypedExtractor::new(chain);
    let patient = extractor.extract(&inputs).await?;

    println!("{patient:#?}");
    Ok(())
}
