//! `wabridge provision` -- one-time creation of the remote assistant.
//!
//! Interactive by default: asks whether to attach a knowledge file and
//! confirms before creating anything. `--yes` skips every prompt.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use wabridge_types::assistant::AssistantDefinition;

use crate::state::AppState;

/// Options collected from the command line.
pub struct ProvisionArgs {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub model: Option<String>,
    pub file: Option<PathBuf>,
    pub yes: bool,
}

/// Build the definition from flags, falling back to configured values.
fn definition_from(state: &AppState, args: &ProvisionArgs) -> AssistantDefinition {
    let settings = &state.config.assistant;
    AssistantDefinition {
        name: args.name.clone().unwrap_or_else(|| settings.name.clone()),
        instructions: args
            .instructions
            .clone()
            .unwrap_or_else(|| settings.instructions.clone()),
        model: args.model.clone().unwrap_or_else(|| settings.model.clone()),
        knowledge_file_ids: Vec::new(),
    }
}

/// Create the assistant and print the id to configure.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// wabridge provision
///
/// # One-shot with a knowledge file
/// wabridge provision --file data/faq.pdf --yes
/// ```
pub async fn provision(state: &AppState, args: ProvisionArgs, json: bool) -> Result<()> {
    let provisioner = state.provisioner()?;
    let interactive = !args.yes && !json;
    let definition = definition_from(state, &args);

    if interactive {
        println!();
        println!("  {} Creating assistant: {}", style("›").cyan().bold(), style(&definition.name).cyan());
        println!("  {} Instructions: {}", style("›").cyan().bold(), style(&definition.instructions).dim());
        println!("  {} Model: {}", style("›").cyan().bold(), &definition.model);
        println!();
    }

    let knowledge_file = match args.file {
        Some(path) => Some(path),
        None if interactive => {
            let wants_file = Confirm::new()
                .with_prompt("Upload a knowledge base file?")
                .default(false)
                .interact()?;
            if wants_file {
                let path = Input::<String>::new()
                    .with_prompt("Path to the file (e.g. data/faq.pdf)")
                    .interact_text()?;
                Some(PathBuf::from(path.trim()))
            } else {
                None
            }
        }
        None => None,
    };

    if let Some(path) = &knowledge_file {
        if !path.is_file() {
            bail!("File not found: {}", path.display());
        }
    }

    if interactive {
        let confirmed = Confirm::new()
            .with_prompt("Create this assistant?")
            .default(true)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let spinner = if interactive {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(if knowledge_file.is_some() {
            "Uploading file and creating assistant..."
        } else {
            "Creating assistant..."
        });
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let result = provisioner.provision(definition, knowledge_file.as_deref()).await;
    spinner.finish_and_clear();
    let assistant = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assistant)?);
        return Ok(());
    }

    let tools = if assistant.tools.is_empty() {
        "none".to_string()
    } else {
        assistant.tools.join(", ")
    };

    println!();
    println!("  {} Assistant created successfully!", style("✓").green().bold());
    println!();
    println!("  {}    {}", style("ID:").bold(), style(&assistant.id).cyan());
    println!(
        "  {}  {}",
        style("Name:").bold(),
        assistant.name.as_deref().unwrap_or("(unnamed)")
    );
    println!("  {} {}", style("Model:").bold(), assistant.model);
    println!("  {} {}", style("Tools:").bold(), tools);
    println!();
    println!("  {}", style("Next steps:").bold());
    println!("  1. Set the assistant id in your environment:");
    println!("     {}", style(format!("OPENAI_ASSISTANT_ID=\"{}\"", assistant.id)).yellow());
    println!("  2. Verify the setup with: {}", style("wabridge check").yellow());
    println!("  3. Try a reply with: {}", style("wabridge reply <user-id> hello").yellow());
    println!();

    Ok(())
}
