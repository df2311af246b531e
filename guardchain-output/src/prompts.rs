//! Canned instruction blocks and prompt compilation.
//!
//! A guarded prompt has three ingredients: the caller's task query
//! (which may contain `{{variable}}` placeholders), the schema block
//! from the [`OutputSpec`], and a fixed instruction suffix telling the
//! model to answer with nothing but a conforming JSON document.
//!
//! Compilation never touches `{{variable}}` placeholders; they are
//! resolved later by the template layer.

use crate::spec::OutputSpec;

/// System instructions for chat models.
///
/// Sent as the system message of every guarded chat call.
pub const JSON_AGENT_INSTRUCTIONS: &str = "\
You are a helpful assistant only capable of communicating with valid JSON, \
and no other text.

Here are examples of a correct and an incorrect response to a request for \
an object with a `name` string and an `age` integer:

Correct:
{\"name\": \"Ada\", \"age\": 36}

Incorrect:
Sure! Here is the requested object:
{\"name\": \"Ada\", \"age\": \"thirty-six\"}

Never wrap the JSON in prose, markdown fences, or explanations.";

/// Preamble introducing the schema block.
pub const SCHEMA_PREAMBLE: &str = "\
Given below is a schema that describes the information to extract. The \
response must be a JSON document whose structure follows this schema \
exactly:";

/// Instruction suffix for completion models.
///
/// Completion models receive no separate system message, so the full
/// contract travels in the prompt itself.
pub const COMPLETE_JSON_SUFFIX: &str = "\
Return ONLY a single valid JSON document that conforms to the schema above.

Requirements:
- Every field named in the schema must be present.
- String values must be JSON strings, numbers must be JSON numbers, and \
lists must be JSON arrays.
- Where the schema constrains a field to specific choices, use one of \
those choices verbatim.
- Do not include any text before or after the JSON document.

JSON output:";

/// Compile the base prompt for a completion-model guard.
///
/// Layout: task query, schema preamble and block, then the JSON-only
/// suffix.
#[must_use]
pub fn compile_completion_prompt(spec: &OutputSpec, query: &str) -> String {
    format!(
        "{query}\n\n{preamble}\n\n{schema}\n\n{suffix}",
        query = query.trim(),
        preamble = SCHEMA_PREAMBLE,
        schema = spec.schema_block(),
        suffix = COMPLETE_JSON_SUFFIX,
    )
}

/// Compile the prompts for a chat-model guard.
///
/// Returns `(instructions, human_prompt)`: the system message and the
/// human message template. The JSON-only contract lives in the system
/// message, so the human prompt only carries the query and the schema.
#[must_use]
pub fn compile_chat_prompt(spec: &OutputSpec, query: &str) -> (String, String) {
    let human = format!(
        "{query}\n\nThe response will be a JSON that follows the correct schema.\n\n\
         {preamble}\n\n{schema}",
        query = query.trim(),
        preamble = SCHEMA_PREAMBLE,
        schema = spec.schema_block(),
    );
    (JSON_AGENT_INSTRUCTIONS.to_string(), human)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = "<object name=\"person\">\n  <string name=\"name\"/>\n</object>";

    #[test]
    fn test_completion_prompt_layout() {
        let spec = OutputSpec::raw(SPEC);
        let prompt = compile_completion_prompt(&spec, "Describe {{subject}}.");

        let query_pos = prompt.find("Describe {{subject}}.").unwrap();
        let schema_pos = prompt.find("<object name=\"person\">").unwrap();
        let suffix_pos = prompt.find("Return ONLY a single valid JSON").unwrap();
        assert!(query_pos < schema_pos);
        assert!(schema_pos < suffix_pos);
    }

    #[test]
    fn test_placeholders_survive_compilation() {
        let spec = OutputSpec::raw(SPEC);
        let (_, human) = compile_chat_prompt(&spec, "Summarize {{notes}} for {{audience}}.");
        assert!(human.contains("{{notes}}"));
        assert!(human.contains("{{audience}}"));
    }

    #[test]
    fn test_chat_prompt_splits_instructions() {
        let spec = OutputSpec::raw(SPEC);
        let (instructions, human) = compile_chat_prompt(&spec, "Extract the person.");
        assert!(instructions.contains("only capable of communicating with valid JSON"));
        assert!(!human.contains("only capable of communicating"));
        assert!(human.contains(SCHEMA_PREAMBLE));
    }
}
