//! Journal file store

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Timestamp format used for journal entries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Local time the entry was written (`YYYY-MM-DD HH:MM`)
    pub timestamp: String,
    /// Entry body
    pub text: String,
}

impl JournalEntry {
    /// Create an entry stamped with the current local time
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            text: text.into(),
        }
    }
}

/// Append-only journal backed by a JSON file
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    entries: Vec<JournalEntry>,
}

impl JournalStore {
    /// Open the journal at `path`.
    ///
    /// A missing file is an empty journal. An unreadable or corrupt file is
    /// logged and also treated as empty; it is only overwritten on the next
    /// successful append.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load journal {}: {}", path.display(), e);
                Vec::new()
            }
        };
        debug!("Opened journal {} with {} entries", path.display(), entries.len());
        Self { path, entries }
    }

    fn load(path: &Path) -> crate::Result<Vec<JournalEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Append a new entry and persist the journal.
    ///
    /// Text is trimmed; blank text is rejected. On a write failure the
    /// entry is not kept in memory either.
    pub fn append(&mut self, text: &str) -> crate::Result<&JournalEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(crate::Error::Validation(
                "journal entry must not be empty".to_string(),
            ));
        }

        self.entries.push(JournalEntry::now(text));
        if let Err(e) = self.save() {
            self.entries.pop();
            return Err(e);
        }

        let count = self.entries.len();
        debug!("Journal now has {} entries", count);
        Ok(&self.entries[count - 1])
    }

    fn save(&self) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .map_err(|e| crate::Error::Journal(format!("{}: {}", self.path.display(), e)))
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The `limit` most recent entries, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
