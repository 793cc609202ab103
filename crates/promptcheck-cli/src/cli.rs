use clap::{Parser, Subcommand};
use promptcheck_runtime::ProviderKind;
use std::path::PathBuf;

/// Extract JSON from LLM replies and validate prompts against agent goals
#[derive(Parser, Debug)]
#[command(name = "promptcheck", version, about, long_about = None)]
pub struct Cli {
    /// LLM backend, overrides LLM_PROVIDER (openai, ollama, google, anthropic, deepseek)
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the JSON payload found in a raw model reply
    Sanitize {
        /// File with the raw reply; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Send a prompt to the configured provider and print the parsed object
    Dispatch {
        /// Context instructions sent as the system message
        #[arg(long)]
        context: String,

        /// Prompt sent as the user message
        #[arg(long)]
        prompt: String,
    },

    /// Ask the provider whether a prompt makes sense for an agent goal
    Validate {
        /// Agent goal file (YAML, or JSON with a .json extension)
        #[arg(long)]
        goal: PathBuf,

        /// Conversation history as a JSON array
        #[arg(long)]
        history: Option<PathBuf>,

        /// The user prompt to validate
        #[arg(long)]
        prompt: String,
    },
}
