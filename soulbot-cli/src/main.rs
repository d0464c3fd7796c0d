//! CLI entry point for SoulBot

mod repl;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use soulbot_agent::{BreathingPattern, Companion};
use soulbot_core::config::{Config, ConfigLoader};
use soulbot_core::journal::JournalStore;
use soulbot_core::logging::init_logging;
use soulbot_core::utils::expand_tilde;
use soulbot_providers::{ChatBackend, OllamaClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "soulbot")]
#[command(about = "An AI emotional wellness companion backed by a local model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Start an interactive chat
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Generate a short positive affirmation
    Affirm,
    /// Generate a two-minute meditation script
    Meditate,
    /// Reframe a negative thought
    Cbt {
        /// The thought to reframe
        #[arg(required = true, trailing_var_arg = true)]
        thought: Vec<String>,
    },
    /// Write or read journal entries
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// Run a guided breathing exercise
    Breathe {
        /// Breathing style: calm, relax or box
        #[arg(short, long, default_value = "calm")]
        style: String,
        /// Approximate length of the exercise in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
    /// Show configuration and backend status
    Status,
}

#[derive(Subcommand)]
enum JournalCommands {
    /// Add an entry
    Add {
        /// Entry text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// List recent entries, newest first
    List {
        /// Maximum number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    // init must work even when the existing file no longer validates
    let config = if matches!(cli.command, Commands::Init) {
        Config::default()
    } else {
        config_loader.load()?
    };
    let _log_guard = init_logging(&config.logging);
    info!("Loaded configuration from {}", config_loader.config_dir().display());

    match cli.command {
        Commands::Init => run_init(&config_loader)?,
        Commands::Chat => {
            info!("Starting chat");
            repl::run_chat(&config, build_companion(&config)).await?;
        }
        Commands::Ask { message } => {
            if let Some(msg) = message {
                run_ask(&config, &msg).await?;
            } else {
                warn!("No message provided");
                println!("Use --message to provide a message");
                println!("Example: soulbot ask --message 'I feel anxious today'");
            }
        }
        Commands::Affirm => {
            let mut companion = build_companion(&config);
            let output = ui::with_spinner("Finding words...", companion.affirmation()).await;
            ui::print_tool_output("Affirmation", &output);
        }
        Commands::Meditate => {
            let companion = build_companion(&config);
            let output =
                ui::with_spinner("Preparing a meditation...", companion.meditation()).await;
            ui::print_tool_output("Meditation", &output);
        }
        Commands::Cbt { thought } => {
            let companion = build_companion(&config);
            let thought = thought.join(" ");
            let output = ui::with_spinner("Reframing...", companion.cbt_reframe(&thought)).await?;
            ui::print_tool_output("CBT Reframe", &output);
        }
        Commands::Journal { command } => {
            let mut journal = JournalStore::open(expand_tilde(&config.journal.path));
            match command {
                JournalCommands::Add { text } => {
                    let entry = journal.append(&text.join(" "))?;
                    println!(
                        "{} {}",
                        style("Saved journal entry").green(),
                        style(&entry.timestamp).dim()
                    );
                }
                JournalCommands::List { limit } => ui::print_journal(&journal, limit),
            }
        }
        Commands::Breathe {
            style: style_name,
            seconds,
        } => {
            let pattern: BreathingPattern = style_name.parse()?;
            ui::run_breathing(pattern, seconds).await;
        }
        Commands::Status => {
            run_status(&config_loader, &config).await?;
        }
    }

    Ok(())
}

fn build_backend(config: &Config) -> Arc<dyn ChatBackend> {
    Arc::new(OllamaClient::from_config(&config.backend))
}

fn build_companion(config: &Config) -> Companion {
    Companion::new(build_backend(config), config)
}

fn run_init(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to SoulBot!").bold().magenta());

    let config_path = loader.config_path();
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Init cancelled.");
            return Ok(());
        }
    }

    let config = Config::default();
    loader.save(&config)?;

    println!("{} {}", style("Wrote").green(), config_path.display());
    println!("\nNext steps:");
    println!("  1. Start your local model server (ollama serve)");
    println!("  2. Pull the model: ollama pull {}", config.backend.model);
    println!("  3. Chat: soulbot chat");
    Ok(())
}

async fn run_ask(config: &Config, message: &str) -> Result<()> {
    let mut companion = build_companion(config);

    match ui::with_spinner("SoulBot is thinking...", companion.respond(message)).await {
        Ok(reply) => {
            ui::print_reply(&reply);
            Ok(())
        }
        Err(e) => {
            error!("Error processing message: {}", e);
            anyhow::bail!("Failed to process message: {}", e);
        }
    }
}

async fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    println!("{}", style("SoulBot Status").bold().magenta());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config file: {}", loader.config_path().display());
    println!("  Backend: {}", config.backend.api_base);
    println!("  Model: {}", config.backend.model);
    println!(
        "  Context window: {} messages, {} chars each",
        config.session.window_size, config.session.max_message_chars
    );
    println!(
        "  Continuations per reply: {}",
        config.generation.max_continuations
    );
    println!("  Journal: {}", expand_tilde(&config.journal.path).display());
    println!();

    println!("{}", style("Backend:").bold());
    let backend = build_backend(config);
    match ui::with_spinner("Checking backend...", backend.health_check()).await {
        Ok(()) => println!("  {}: {}", backend.model_name(), style("ready").green()),
        Err(e) if e.is_connection_failure() => {
            println!("  {}: {}", config.backend.api_base, style("offline").red());
        }
        Err(e) => println!("  {}: {}", backend.model_name(), style(e.to_string()).yellow()),
    }

    Ok(())
}
