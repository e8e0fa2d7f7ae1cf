//! Strict parsing of structured completion output

use serde_json::Value;

use crate::errors::RagChatError;
use crate::errors::Result;

/// Answer and self-reported reasoning from the answer completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub thoughts: String,
}

/// Parse `{"answer": string, "thoughts": string}`
pub fn parse_answer(text: &str) -> Result<GeneratedAnswer> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
        RagChatError::MalformedCompletion(format!("answer is not valid JSON: {e}"))
    })?;

    let Value::Object(object) = value else {
        return Err(RagChatError::MalformedCompletion(
            "answer is not a JSON object".to_string(),
        ));
    };

    let field = |name: &str| -> Result<String> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RagChatError::MissingField(name.to_string()))
    };

    Ok(GeneratedAnswer {
        answer: field("answer")?,
        thoughts: field("thoughts")?,
    })
}

/// Parse a JSON array of follow-up question strings
pub fn parse_followup_questions(text: &str) -> Result<Vec<String>> {
    serde_json::from_str(text.trim()).map_err(|e| {
        RagChatError::MalformedCompletion(format!("follow-up questions are not a JSON string list: {e}"))
    })
}

/// Append each question to `answer` as ` <<question>> `
pub fn append_followup_markers(answer: &mut String, questions: &[String]) {
    for question in questions {
        answer.push_str(&format!(" <<{question}>> "));
    }
}
