//! `wabridge check` -- configuration health check.
//!
//! Reports the data directory, whether the API key and assistant id are set,
//! and, when both are, fetches the assistant to prove the id is valid.

use anyhow::Result;
use console::style;

use wabridge_types::assistant::Assistant;

use crate::state::AppState;

/// Outcome of validating the configured assistant id.
enum AssistantCheck {
    Skipped(&'static str),
    Found(Assistant),
    Failed(String),
}

pub async fn check(state: &AppState, json: bool) -> Result<()> {
    let assistant_id = state.config.assistant.assistant_id.as_deref();

    let assistant_check = match (state.has_api_key(), assistant_id) {
        (false, _) => AssistantCheck::Skipped("OPENAI_API_KEY not set"),
        (true, None) => AssistantCheck::Skipped("OPENAI_ASSISTANT_ID not set"),
        (true, Some(id)) => match state.provisioner()?.retrieve_assistant(id).await {
            Ok(assistant) => AssistantCheck::Found(assistant),
            Err(e) => AssistantCheck::Failed(e.to_string()),
        },
    };

    if json {
        let (status, detail) = match &assistant_check {
            AssistantCheck::Skipped(reason) => ("skipped", serde_json::json!(reason)),
            AssistantCheck::Found(a) => ("ok", serde_json::to_value(a)?),
            AssistantCheck::Failed(e) => ("error", serde_json::json!(e)),
        };
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "api_key_configured": state.has_api_key(),
            "ai_enabled": state.generator.is_enabled(),
            "assistant_id": assistant_id,
            "base_url": state.config.assistant.base_url,
            "assistant_check": { "status": status, "detail": detail },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} wabridge v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Configuration ──").dim());
    println!("  Data dir:     {}", style(state.data_dir.display()).dim());
    println!("  Database:     {}", style("SQLite (WAL mode)").dim());
    println!("  Base URL:     {}", state.config.assistant.base_url);
    println!(
        "  API key:      {}",
        if state.has_api_key() {
            style("configured").green()
        } else {
            style("missing (fallback replies)").yellow()
        }
    );
    println!(
        "  Assistant id: {}",
        match assistant_id {
            Some(id) => style(id.to_string()).cyan(),
            None => style("missing".to_string()).yellow(),
        }
    );
    println!();

    println!("  {}", style("── Assistant ──").dim());
    match &assistant_check {
        AssistantCheck::Skipped(reason) => {
            println!("  {} Skipped: {}", style("-").dim(), reason);
        }
        AssistantCheck::Found(a) => {
            println!(
                "  {} {} ({})",
                style("✓").green().bold(),
                a.name.as_deref().unwrap_or("(unnamed)"),
                a.model
            );
            if !a.tools.is_empty() {
                println!("    Tools: {}", a.tools.join(", "));
            }
        }
        AssistantCheck::Failed(e) => {
            println!("  {} {}", style("✗").red().bold(), e);
        }
    }
    println!();

    Ok(())
}
