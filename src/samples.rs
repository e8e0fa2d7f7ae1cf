//! Example questions offered to users who do not know what to ask

use std::fmt;

/// The questions shown by chat front-ends and the `examples` command
pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What is included in my Northwind Health Plus plan that is not in standard?",
    "What happens in a performance review?",
    "What does a Product Manager do?",
];

type SelectionHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Fixed example questions with an optional selection handler
pub struct ExampleQuestions {
    on_select: Option<SelectionHandler>,
}

impl ExampleQuestions {
    #[must_use]
    pub const fn new() -> Self {
        Self { on_select: None }
    }

    /// Register the handler notified when a question is selected
    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_select = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn questions(&self) -> &'static [&'static str] {
        &EXAMPLE_QUESTIONS
    }

    /// Select the question at `index`, notifying the handler if one is registered
    pub fn select(&self, index: usize) -> Option<&'static str> {
        let question = EXAMPLE_QUESTIONS.get(index).copied()?;
        if let Some(handler) = &self.on_select {
            handler(question);
        }
        Some(question)
    }
}

impl Default for ExampleQuestions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExampleQuestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExampleQuestions")
            .field("has_handler", &self.on_select.is_some())
            .finish()
    }
}
