//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::models::RequestOverrides;
use crate::models::RetrievalMode;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Retrieval-augmented chat over an enterprise document index")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: $DOCCHAT_CONFIG, then config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Ask a single question and print the grounded answer
    Ask(AskArgs),
    /// List the example questions
    Examples,
    /// Show current configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,
    /// Retrieval mode
    #[arg(short, long, value_enum, default_value = "hybrid")]
    pub mode: ModeArg,
    /// Number of documents to retrieve
    #[arg(short, long)]
    pub top: Option<usize>,
    /// Exclude documents of this category
    #[arg(long)]
    pub exclude_category: Option<String>,
    /// Sampling temperature for the answer
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Suggest follow-up questions
    #[arg(long)]
    pub followup: bool,
    /// Use the semantic ranker
    #[arg(long)]
    pub semantic_ranker: bool,
    /// Use semantic captions instead of full passages
    #[arg(long)]
    pub semantic_captions: bool,
}

impl AskArgs {
    /// Request overrides equivalent to these flags
    pub fn overrides(&self) -> RequestOverrides {
        RequestOverrides {
            top: self.top,
            retrieval_mode: Some(self.mode.into()),
            temperature: self.temperature,
            semantic_ranker: Some(self.semantic_ranker),
            semantic_captions: Some(self.semantic_captions),
            suggest_followup_questions: Some(self.followup),
            exclude_category: self.exclude_category.clone(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Keyword search on a rewritten query
    Text,
    /// Vector search on the question embedding
    Vector,
    /// Both
    Hybrid,
}

impl From<ModeArg> for RetrievalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Text => Self::Text,
            ModeArg::Vector => Self::Vector,
            ModeArg::Hybrid => Self::Hybrid,
        }
    }
}
