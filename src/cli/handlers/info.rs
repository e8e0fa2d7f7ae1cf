//! Information display handlers (examples, config)

use crate::cli::output::*;
use crate::samples::ExampleQuestions;
use crate::AppConfig;
use crate::Result;

pub fn handle_examples_command() {
    let examples = ExampleQuestions::new();
    print_info("💡 Example questions:");
    for (i, question) in examples.questions().iter().enumerate() {
        println!("  {}. {}", i + 1, question);
    }
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    match config.validate() {
        Ok(()) => print_success("Configuration is valid"),
        Err(e) => print_warning(&e.to_string()),
    }
    Ok(())
}
