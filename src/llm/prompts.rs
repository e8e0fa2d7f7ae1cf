//! Prompt templates for the read-retrieve-read chat flow

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var.as_str()) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Render a template that has a single variable
    #[must_use]
    pub fn render_one(&self, name: &str, value: &str) -> String {
        self.render(&HashMap::from([(name, value)]))
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Answer given when the sources do not cover the question
pub const UNKNOWN_ANSWER: &str = "No lo sé";

/// Standard chat prompt templates
pub struct ChatPrompts;

impl ChatPrompts {
    /// System turn for turning a conversation into a search query
    #[must_use]
    pub const fn query_rewrite_system() -> &'static str {
        "You are a helpful AI assistant, generate search query for followup question.
Make your respond simple and precise. Return the query only, do not return any other text.
e.g.
Northwind Health Plus AND standard plan.
standard plan AND dental AND employee benefit.
"
    }

    /// System turn for answer generation
    #[must_use]
    pub const fn answer_system() -> &'static str {
        "You are a system assistant who helps the company employees with their questions. Be brief in your answers"
    }

    /// Final user turn for text-only answers, with per-sentence citations
    #[must_use]
    pub fn answer_with_citations() -> PromptTemplate {
        PromptTemplate::new(format!(
            r#"## Source ##
{{{{sources}}}}
## End ##

Your answer needs to be a json object with the following format.
{{
    "answer": // the answer to the question, add a source reference to the end of each sentence. e.g. Apple is a fruit [reference1.pdf][reference2.pdf]. If no source available, put the answer as {UNKNOWN_ANSWER}.
    "thoughts": // brief thoughts on how you came up with the answer, e.g. what sources you used, what you thought about, etc.
}}
Don't put your answer between ```json and ```, return the json string directly."#
        ))
    }

    /// Final user turn text when images accompany the sources
    #[must_use]
    pub fn answer_with_images() -> PromptTemplate {
        PromptTemplate::new(format!(
            r#"## Source ##
{{{{sources}}}}
## End ##

Answer question based on available source and images.
Your answer needs to be a json object with answer and thoughts field.
Don't put your answer between ```json and ```, return the json string directly. e.g {{"answer": "{UNKNOWN_ANSWER}", "thoughts": "{UNKNOWN_ANSWER}"}}"#
        ))
    }

    /// System turn for follow-up question generation
    #[must_use]
    pub const fn followup_system() -> &'static str {
        "You are a helpful AI assistant"
    }

    /// User turn asking for three follow-up questions to `{{answer}}`
    #[must_use]
    pub fn followup_questions() -> PromptTemplate {
        PromptTemplate::new(
            r#"Generate three follow-up question based on the answer you just generated.
# Answer
{{answer}}

# Format of the response
Return the follow-up question as a json string list. Don't put your answer between ```json and ```, return the json string directly.
e.g.
[
    "What is the deductible?",
    "What is the co-pay?",
    "What is the out-of-pocket maximum?"
]"#,
        )
    }
}
