//! `wabridge reply` -- answer one inbound message.

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use wabridge_types::session::UserId;

use crate::state::AppState;

/// Text a webhook layer would send back when generation fails.
const APOLOGY: &str = "Sorry, I couldn't process your message right now. Please try again later.";

/// Generate and print the reply to `text` from `user_id`.
///
/// # Examples
///
/// ```bash
/// wabridge reply 15551234567 "What time is check-in?" --name Ann
/// wabridge reply 15551234567 hello --json
/// ```
pub async fn reply(
    state: &AppState,
    user_id: &str,
    text: &str,
    display_name: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let user_id = UserId::from(user_id);

    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Waiting for the assistant...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let result = state
        .generator
        .generate_response(text, &user_id, display_name)
        .await;

    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            if json {
                let out = serde_json::json!({
                    "user_id": user_id,
                    "reply": reply,
                    "ai_enabled": state.generator.is_enabled(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{reply}");
            }
            Ok(())
        }
        Err(err) => {
            if json {
                let out = serde_json::json!({
                    "user_id": user_id,
                    "reply": APOLOGY,
                    "error": err.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{APOLOGY}");
            }
            Err(anyhow::Error::new(err).context(format!("failed to generate a reply for {user_id}")))
        }
    }
}
