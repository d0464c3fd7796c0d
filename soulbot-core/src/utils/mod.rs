//! Utility functions and helpers

use std::path::{Path, PathBuf};

/// Marker inserted between the kept head and tail of a truncated message
pub const ELISION_MARKER: &str = "\n...\n";

/// Characters shaved off each half of the budget to leave room for the marker
const ELISION_MARGIN: usize = 10;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Shorten `msg` to at most `max_chars` characters, keeping its start and end.
///
/// Content within budget is returned unchanged. Longer content keeps
/// `max_chars / 2 - 10` characters from each end joined by [`ELISION_MARKER`],
/// so the cut is always visible. Counts are in `char`s, never bytes.
pub fn truncate_message(msg: &str, max_chars: usize) -> String {
    let total = msg.chars().count();
    if total <= max_chars {
        return msg.to_string();
    }

    let keep = (max_chars / 2).saturating_sub(ELISION_MARGIN);
    let head: String = msg.chars().take(keep).collect();
    let tail: String = msg.chars().skip(total - keep).collect();
    format!("{}{}{}", head, ELISION_MARKER, tail)
}

/// Single-line preview for logs: first `max_chars` characters plus `...`
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
