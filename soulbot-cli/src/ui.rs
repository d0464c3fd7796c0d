//! Terminal output helpers shared by the one-shot commands and the chat loop

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use soulbot_agent::companion::Reply;
use soulbot_agent::tools::ToolOutput;
use soulbot_agent::BreathingPattern;
use soulbot_core::journal::{JournalEntry, JournalStore};
use soulbot_core::mood::MoodLog;
use soulbot_core::utils::truncate_message;
use std::future::Future;
use std::time::Duration;

/// Characters of journal text shown in listings
const JOURNAL_PREVIEW_CHARS: usize = 300;

/// Await `fut` while a spinner with `message` runs on stderr
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    spinner.finish_and_clear();
    output
}

pub fn print_reply(reply: &Reply) {
    if reply.is_offline() {
        println!("{}", style(reply.text()).yellow());
    } else {
        println!("{} {}", style("SoulBot:").bold().magenta(), reply.text());
    }
}

pub fn print_tool_output(title: &str, output: &ToolOutput) {
    println!("{}", style(title).bold().cyan());
    if output.is_generated() {
        println!("{}", output.text());
    } else {
        println!("{}", style(output.text()).yellow());
    }
}

pub fn print_journal(store: &JournalStore, limit: usize) {
    if store.is_empty() {
        println!("{}", style("No journal entries yet.").dim());
        return;
    }
    println!("{}", style("Recent journal entries:").bold());
    for entry in store.recent(limit) {
        println!(
            "  {} {}",
            style(&entry.timestamp).dim(),
            journal_excerpt(entry)
        );
    }
}

/// Entry text shortened for listings, keeping its start and end
fn journal_excerpt(entry: &JournalEntry) -> String {
    truncate_message(&entry.text, JOURNAL_PREVIEW_CHARS)
}

pub fn print_mood(mood: &MoodLog) {
    let Some(average) = mood.average_score() else {
        println!("{}", style("No mood data yet. Chat a little first.").dim());
        return;
    };

    println!("{}", style("Mood over this session:").bold());
    for (timestamp, score) in mood.score_series() {
        println!(
            "  {} {}",
            style(timestamp.format("%H:%M:%S")).dim(),
            "#".repeat(score as usize + 1)
        );
    }
    println!("{}", style("Emotions detected:").bold());
    for (emotion, count) in mood.distribution() {
        println!("  {:<10} {}", emotion.as_str(), count);
    }
    println!("Average mood score: {:.1} / 5", average);
}

pub fn print_badges(badges: &[&str]) {
    if badges.is_empty() {
        println!("{}", style("No badges yet. Keep going!").dim());
        return;
    }
    println!("{}", style("Your badges:").bold());
    for badge in badges {
        println!("  {}", badge);
    }
}

/// Walk through whole breathing cycles that fit in `seconds`
pub async fn run_breathing(pattern: BreathingPattern, seconds: u64) {
    let cycles = pattern.cycles_for(seconds);
    println!(
        "{} ({} cycles of {}s)",
        style(pattern.name()).bold().cyan(),
        cycles,
        pattern.total_secs()
    );

    for cycle in 1..=cycles {
        for (phase, secs) in pattern.phases() {
            let bar = ProgressBar::new(secs);
            bar.set_style(
                ProgressStyle::with_template("{msg:>8} [{bar:24.cyan/blue}] {pos}/{len}s")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message(format!("{} {}", cycle, phase));
            for _ in 0..secs {
                tokio::time::sleep(Duration::from_secs(1)).await;
                bar.inc(1);
            }
            bar.finish_and_clear();
        }
    }
    println!("{}", style("Well done. Notice how you feel now.").green());
}
