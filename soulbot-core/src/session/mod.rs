//! Conversation session state
//!
//! A session owns the append-only message log of one conversation and
//! derives the bounded context window that is sent to the model backend.

pub mod store;
pub mod window;

pub use store::{Message, Role, Session};
pub use window::WindowConfig;
