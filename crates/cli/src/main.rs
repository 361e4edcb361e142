//! replybot CLI, the main entry point.
//!
//! Commands:
//! - `complete` runs one request through the queue and worker
//! - `classify` rates a piece of text with the safety classifier
//! - `render`   prints the prompt a thread file would produce
//! - `config`   prints the effective configuration
//! - `doctor`   diagnoses configuration and engine health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "replybot",
    about = "replybot: safety-checked reply completions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of ~/.replybot/config.toml
    #[arg(short, long, global = true, env = "REPLYBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a reply to a prompt or a thread
    Complete {
        /// Literal prompt text
        #[arg(short, long, conflicts_with = "thread", required_unless_present = "thread")]
        prompt: Option<String>,

        /// JSON thread file, oldest line first
        #[arg(short, long)]
        thread: Option<PathBuf>,

        /// Model name (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling temperature in [0, 1]
        #[arg(long)]
        temperature: Option<f32>,

        /// Maximum reply length in tokens
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Stop pattern; the reply is cut at its first match
        #[arg(long)]
        stop: Option<String>,
    },

    /// Rate text with the safety classifier
    Classify {
        /// Text to classify
        text: String,
    },

    /// Print the prompt rendered from a thread file
    Render {
        #[arg(short, long)]
        thread: PathBuf,
    },

    /// Show the effective configuration (secrets removed)
    Config,

    /// Diagnose configuration and engine health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Complete {
            prompt,
            thread,
            model,
            temperature,
            max_tokens,
            stop,
        } => {
            let args = commands::complete::CompleteArgs {
                prompt,
                thread,
                model,
                temperature,
                max_tokens,
                stop,
            };
            commands::complete::run(config_path, args).await?
        }
        Commands::Classify { text } => commands::classify::run(config_path, &text).await?,
        Commands::Render { thread } => commands::render::run(config_path, &thread)?,
        Commands::Config => commands::config_cmd::show(config_path)?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
