//! Companion logic for SoulBot
//!
//! This crate provides the conversation companion (context window,
//! truncation recovery), the wellness tools built on the model backend,
//! and breathing exercise timing.

pub mod breathing;
pub mod companion;
pub mod context;
pub mod tools;
pub mod truncation;

pub use breathing::{BreathingPattern, BreathingPhase};
pub use companion::{Companion, Reply, OFFLINE_NOTICE};
pub use context::ContextBuilder;
pub use truncation::{PunctuationHeuristic, TruncationDetector};
