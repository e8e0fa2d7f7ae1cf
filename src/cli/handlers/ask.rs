//! One-shot question answering from the terminal

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::commands::AskArgs;
use crate::cli::output::*;
use crate::models::ChatMessage;
use crate::rag::ReadRetrieveReadChatService;
use crate::AppConfig;
use crate::Result;

/// Answer a single question; Ctrl-C cancels the turn in flight
pub async fn handle_ask_command(config: &AppConfig, args: &AskArgs) -> Result<()> {
    let service = ReadRetrieveReadChatService::from_config(config)?;
    let overrides = args.overrides();
    let history = vec![ChatMessage::user(args.question.clone())];

    print_info(&format!("🤔 Question: {}", args.question));
    debug!("Request overrides: {:?}", overrides);
    println!();

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let result = service.reply(&history, Some(&overrides), &cancel).await;
    interrupt.abort();

    print_chat_response(&result?);
    Ok(())
}
