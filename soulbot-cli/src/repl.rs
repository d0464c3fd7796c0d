//! Interactive chat loop

use anyhow::Result;
use console::style;
use dialoguer::Input;
use soulbot_agent::{BreathingPattern, Companion};
use soulbot_core::config::Config;
use soulbot_core::journal::JournalStore;
use soulbot_core::session::Role;
use soulbot_core::utils::{expand_tilde, truncate_message};
use tracing::{info, warn};

use crate::ui;

/// Seconds a `/breathe` exercise lasts inside the chat
const CHAT_BREATHING_SECS: u64 = 30;

/// Journal entries shown by a bare `/journal`
const CHAT_JOURNAL_LIMIT: usize = 5;

/// A slash command typed in the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Affirm,
    Meditate,
    Cbt(String),
    Journal(Option<String>),
    Mood,
    Badges,
    Breathe(Option<String>),
    History,
    Help,
    Quit,
    Unknown(String),
}

/// One line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    Command(SlashCommand),
    Empty,
}

/// Classify a line typed at the prompt
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let arg = (!arg.is_empty()).then(|| arg.to_string());

    let command = match name.to_lowercase().as_str() {
        "affirm" | "affirmation" => SlashCommand::Affirm,
        "meditate" | "meditation" => SlashCommand::Meditate,
        "cbt" => SlashCommand::Cbt(arg.unwrap_or_default()),
        "journal" => SlashCommand::Journal(arg),
        "mood" => SlashCommand::Mood,
        "badges" => SlashCommand::Badges,
        "breathe" => SlashCommand::Breathe(arg),
        "history" => SlashCommand::History,
        "help" | "?" => SlashCommand::Help,
        "quit" | "exit" | "q" => SlashCommand::Quit,
        other => SlashCommand::Unknown(other.to_string()),
    };
    ChatInput::Command(command)
}

fn print_help() {
    println!("{}", style("Commands:").bold());
    for (command, about) in [
        ("/affirm", "a short positive affirmation"),
        ("/meditate", "a two-minute meditation script"),
        ("/cbt <thought>", "reframe a negative thought"),
        ("/journal [text]", "save an entry, or list recent ones"),
        ("/mood", "mood trend for this session"),
        ("/badges", "badges earned so far"),
        ("/breathe [calm|relax|box]", "guided breathing"),
        ("/history", "show the conversation"),
        ("/quit", "leave the chat"),
    ] {
        println!("  {:<26} {}", style(command).cyan(), about);
    }
}

fn print_history(companion: &Companion, max_chars: usize) {
    let mut any = false;
    for message in companion.session().visible_messages() {
        any = true;
        let who = match message.role {
            Role::User => style("You:").bold().green(),
            _ => style("SoulBot:").bold().magenta(),
        };
        println!("{} {}", who, truncate_message(&message.content, max_chars));
    }
    if !any {
        println!("{}", style("Nothing said yet.").dim());
    }
}

/// Run the chat loop until `/quit` or end of input
pub async fn run_chat(config: &Config, mut companion: Companion) -> Result<()> {
    let mut journal = JournalStore::open(expand_tilde(&config.journal.path));

    println!("{}", style("SoulBot").bold().magenta());
    println!(
        "{}",
        style("Your AI emotional wellness companion. Type /help for commands.").dim()
    );
    info!(
        "Chat session {} started with model {}",
        companion.session().id,
        companion.model_name()
    );

    loop {
        let line: String = match Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                warn!("Input closed: {}", e);
                break;
            }
        };

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Message(text) => {
                let reply =
                    ui::with_spinner("SoulBot is thinking...", companion.respond(&text)).await?;
                ui::print_reply(&reply);
                if !reply.is_offline() {
                    let emotion = companion.detect_emotion(&text).await;
                    info!("Detected emotion: {}", emotion);
                }
            }
            ChatInput::Command(command) => match command {
                SlashCommand::Affirm => {
                    let output = ui::with_spinner("Finding words...", companion.affirmation()).await;
                    ui::print_tool_output("Affirmation", &output);
                }
                SlashCommand::Meditate => {
                    let output =
                        ui::with_spinner("Preparing a meditation...", companion.meditation()).await;
                    ui::print_tool_output("Meditation", &output);
                }
                SlashCommand::Cbt(thought) => {
                    if thought.is_empty() {
                        println!("{}", style("Usage: /cbt <negative thought>").yellow());
                        continue;
                    }
                    let output =
                        ui::with_spinner("Reframing...", companion.cbt_reframe(&thought)).await?;
                    ui::print_tool_output("CBT Reframe", &output);
                }
                SlashCommand::Journal(Some(text)) => match journal.append(&text) {
                    Ok(entry) => {
                        println!("{} {}", style("Saved").green(), style(&entry.timestamp).dim());
                        companion.record_journal();
                    }
                    Err(e) => println!("{}", style(format!("Could not save entry: {}", e)).red()),
                },
                SlashCommand::Journal(None) => ui::print_journal(&journal, CHAT_JOURNAL_LIMIT),
                SlashCommand::Mood => ui::print_mood(companion.mood_log()),
                SlashCommand::Badges => ui::print_badges(&companion.badges().badges()),
                SlashCommand::Breathe(style_name) => {
                    let pattern = match style_name {
                        Some(name) => match name.parse::<BreathingPattern>() {
                            Ok(pattern) => pattern,
                            Err(e) => {
                                println!("{}", style(e.to_string()).yellow());
                                continue;
                            }
                        },
                        None => BreathingPattern::default(),
                    };
                    ui::run_breathing(pattern, CHAT_BREATHING_SECS).await;
                }
                SlashCommand::History => {
                    print_history(&companion, config.session.display_message_chars)
                }
                SlashCommand::Help => print_help(),
                SlashCommand::Quit => break,
                SlashCommand::Unknown(name) => {
                    println!(
                        "{}",
                        style(format!("Unknown command /{}. Try /help.", name)).yellow()
                    );
                }
            },
        }
    }

    let session = companion.session();
    info!(
        "Chat session {} ended after {}s with {} messages",
        session.id,
        session.age().num_seconds(),
        session.len()
    );
    println!("{}", style("Take care. SoulBot is here whenever you need.").dim());
    Ok(())
}
