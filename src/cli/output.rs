//! Output formatting and display functions

use crate::models::ChatAppResponse;
use crate::AppConfig;

/// Maximum characters of a supporting passage shown in the terminal
const PASSAGE_PREVIEW_CHARS: usize = 160;

/// Truncate a string to at most `max_chars` characters, appending "..." if cut
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

pub fn print_chat_response(response: &ChatAppResponse) {
    let Some(choice) = response.choices.first() else {
        print_warning("No answer returned");
        return;
    };

    println!("💬 Answer:");
    println!("{}", choice.message.content);
    println!();

    if let Some(documents) = &choice.context.data_points_content {
        println!("📚 Sources ({}):", documents.len());
        for doc in documents {
            println!(
                "  • {}: {}",
                doc.title,
                truncate_str(&doc.content, PASSAGE_PREVIEW_CHARS)
            );
        }
        println!();
    }

    if let Some(images) = &choice.context.data_points_images {
        println!("🖼️  Images ({}):", images.len());
        for image in images {
            println!("  • {} ({})", image.title, image.url);
        }
        println!();
    }

    if !choice.context.followup_questions.is_empty() {
        println!("❓ Follow-up questions:");
        for question in &choice.context.followup_questions {
            println!("  • {question}");
        }
        println!();
    }

    for thought in &choice.context.thoughts {
        println!("🧠 {}: {}", thought.title, thought.description);
    }
    println!("🔗 Citation base URL: {}", choice.citation_base_url);
}

pub fn print_config(config: &AppConfig) {
    println!("📋 docchat Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", display_endpoint(config.llm_endpoint()));
    println!("  Key: {}", mask_secret(config.llm_key()));
    println!("  Model: {}", config.llm_model());
    if let Some(version) = &config.llm.api_version {
        println!("  API version: {version}");
    }
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", display_endpoint(&config.embeddings.endpoint));
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!();

    println!("🔎 Search:");
    println!("  Endpoint: {}", display_endpoint(&config.search.endpoint));
    println!("  Key: {}", mask_secret(&config.search.api_key));
    println!("  Index: {}", config.search.index);
    println!(
        "  Image index: {}",
        config.search.image_index.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Semantic configuration: {}",
        config.search.semantic_configuration
    );
    println!();

    println!("🖼️  Vision:");
    match &config.vision {
        Some(vision) => {
            println!("  Endpoint: {}", display_endpoint(&vision.endpoint));
            println!("  Model version: {}", vision.model_version);
        }
        None => println!("  Disabled"),
    }
    println!("  Image retrieval: {}", config.vision_enabled());
    println!();

    println!("🗂️  Storage:");
    println!("  Citation base URL: {}", config.citation_base_url());
    println!(
        "  Access token: {}",
        if config.credential.is_some() {
            "client credentials"
        } else if config.storage.sas_token.is_some() {
            "SAS token"
        } else {
            "none"
        }
    );
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.cors);
    println!();
}

/// Endpoint without credentials or query string
fn display_endpoint(endpoint: &str) -> String {
    match url::Url::parse(endpoint) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            let _ = parsed.set_password(None);
            let _ = parsed.set_username("");
            parsed.to_string()
        }
        Err(_) => "***invalid***".to_string(),
    }
}

/// Show only the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 8 {
        return "***".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("***{tail}")
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
