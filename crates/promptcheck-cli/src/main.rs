use anyhow::Context;
use clap::Parser;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use promptcheck_core::{sanitize, AgentGoal, ConversationTurn, PromptRequest};
use promptcheck_runtime::{LlmSettings, PromptDispatcher, PromptValidator, ProviderKind};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sanitize { file } => {
            let raw = read_input(file.as_deref())?;
            let json = sanitize(&raw).context("no JSON payload in input")?;
            println!("{json}");
        }
        Command::Dispatch { context, prompt } => {
            let dispatcher = PromptDispatcher::from_settings(&settings(cli.provider))?;
            let parsed = dispatcher
                .dispatch(&PromptRequest::new(prompt, context))
                .await?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Validate {
            goal,
            history,
            prompt,
        } => {
            let goal = AgentGoal::from_file(&goal)
                .with_context(|| format!("failed to load goal from {}", goal.display()))?;
            let history = match history {
                Some(path) => read_history(&path)?,
                None => Vec::new(),
            };

            let validator = PromptValidator::from_settings(&settings(cli.provider))?;
            let outcome = validator.validate(&goal, &history, &prompt).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

fn settings(provider: Option<ProviderKind>) -> LlmSettings {
    let settings = LlmSettings::from_env();
    match provider {
        Some(kind) => settings.with_provider(kind),
        None => settings,
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn read_history(path: &Path) -> anyhow::Result<Vec<ConversationTurn>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of turns", path.display()))
}
