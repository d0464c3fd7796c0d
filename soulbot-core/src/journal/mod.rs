//! Journal persistence
//!
//! Journal entries are kept as a flat JSON array of `{timestamp, text}`
//! records and rewritten whole on every append.

pub mod store;

pub use store::{JournalEntry, JournalStore};
