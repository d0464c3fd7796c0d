//! Emotion labels and the per-session mood log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Emotion label produced by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Anxious,
    #[default]
    Neutral,
    Stressed,
    Excited,
    Tired,
}

impl Emotion {
    /// Every label, in the order the classifier prompt lists them
    pub const ALL: [Emotion; 8] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Anxious,
        Emotion::Neutral,
        Emotion::Stressed,
        Emotion::Excited,
        Emotion::Tired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Anxious => "anxious",
            Emotion::Neutral => "neutral",
            Emotion::Stressed => "stressed",
            Emotion::Excited => "excited",
            Emotion::Tired => "tired",
        }
    }

    /// Mood score on a 0 (worst) to 5 (best) scale
    pub fn mood_score(&self) -> u8 {
        match self {
            Emotion::Happy => 5,
            Emotion::Excited => 4,
            Emotion::Neutral => 3,
            Emotion::Tired => 2,
            Emotion::Sad | Emotion::Anxious | Emotion::Stressed => 1,
            Emotion::Angry => 0,
        }
    }

    /// First label whose name occurs in `text` (case-insensitive)
    pub fn scan(text: &str) -> Option<Emotion> {
        let lower = text.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| lower.contains(e.as_str()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| crate::Error::Validation(format!("unknown emotion: {}", s)))
    }
}

/// A logged emotion observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
}

/// Emotions detected over a session
#[derive(Debug, Clone, Default)]
pub struct MoodLog {
    entries: Vec<MoodEntry>,
}

impl MoodLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emotion observed now
    pub fn record(&mut self, emotion: Emotion) {
        self.record_at(emotion, Utc::now());
    }

    /// Record an emotion with an explicit timestamp
    pub fn record_at(&mut self, emotion: Emotion, timestamp: DateTime<Utc>) {
        self.entries.push(MoodEntry { timestamp, emotion });
    }

    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mood scores ordered by time
    pub fn score_series(&self) -> Vec<(DateTime<Utc>, u8)> {
        let mut series: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.timestamp, e.emotion.mood_score()))
            .collect();
        series.sort_by_key(|(ts, _)| *ts);
        series
    }

    /// Count per emotion, most frequent first (ties broken by label order)
    pub fn distribution(&self) -> Vec<(Emotion, usize)> {
        let mut counts: HashMap<Emotion, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.emotion).or_default() += 1;
        }

        let mut distribution: Vec<_> = Emotion::ALL
            .iter()
            .filter_map(|e| counts.get(e).map(|c| (*e, *c)))
            .collect();
        distribution.sort_by(|a, b| b.1.cmp(&a.1));
        distribution
    }

    /// Mean mood score, or `None` when nothing has been logged
    pub fn average_score(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u32 = self
            .entries
            .iter()
            .map(|e| u32::from(e.emotion.mood_score()))
            .sum();
        Some(f64::from(total) / self.entries.len() as f64)
    }
}
