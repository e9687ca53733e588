//! Session inspection CLI commands: show, list.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use wabridge_core::storage::session_store::SessionStore;
use wabridge_types::session::UserId;

use crate::state::AppState;

/// Show the session mapped to a user.
///
/// # Examples
///
/// ```bash
/// wabridge session show 15551234567
/// ```
pub async fn show_session(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let record = state.sessions.get_record(&UserId::from(user_id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let Some(record) = record else {
        println!();
        println!(
            "  {} No session for '{}'. One is created on the first message.",
            style("i").blue().bold(),
            style(user_id).cyan()
        );
        println!();
        return Ok(());
    };

    println!();
    println!("  {}  {}", style("User:").bold(), style(&record.user_id).cyan());
    println!("  {}  {}", style("Thread:").bold(), record.session_id);
    println!(
        "  {}  {}",
        style("Created:").bold(),
        style(format_time(&record.created_at)).dim()
    );
    println!(
        "  {}  {}",
        style("Updated:").bold(),
        style(format_time(&record.updated_at)).dim()
    );
    println!();

    Ok(())
}

/// List stored sessions, most recently updated first.
///
/// # Examples
///
/// ```bash
/// wabridge session list
/// wabridge session ls -n 20 --json
/// ```
pub async fn list_sessions(state: &AppState, limit: Option<i64>, json: bool) -> Result<()> {
    let records = state.sessions.list(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Try: {}",
            style("i").blue().bold(),
            style("wabridge reply <user-id> hello").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("User").fg(Color::White),
        Cell::new("Thread").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last used").fg(Color::White),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(&record.user_id).fg(Color::Cyan),
            Cell::new(&record.session_id).fg(Color::White),
            Cell::new(format_time(&record.created_at)).fg(Color::DarkGrey),
            Cell::new(format_time(&record.updated_at)).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(records.len()).bold(),
        if records.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
