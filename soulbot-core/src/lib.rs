//! Core types for SoulBot
//!
//! This crate provides the conversation session and context window, the
//! configuration layer, logging setup, and the small persistent stores
//! (journal, mood log, badges) shared by the other SoulBot crates.

pub mod badges;
pub mod config;
pub mod error;
pub mod journal;
pub mod logging;
pub mod mood;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
