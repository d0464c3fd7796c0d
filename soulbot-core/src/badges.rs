//! Achievement badges earned by using the wellness tools

use serde::{Deserialize, Serialize};

/// Usage counters that unlock badges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProgress {
    /// Chat turns sent
    pub sessions: u32,
    /// Affirmations generated
    pub affirmations: u32,
    /// Journal entries saved
    pub journals: u32,
}

impl BadgeProgress {
    pub fn record_session(&mut self) {
        self.sessions += 1;
    }

    pub fn record_affirmation(&mut self) {
        self.affirmations += 1;
    }

    pub fn record_journal(&mut self) {
        self.journals += 1;
    }

    /// Badges unlocked so far
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.sessions >= 3 {
            badges.push("🌱 Calm Starter");
        }
        if self.affirmations >= 5 {
            badges.push("✨ Positive Soul");
        }
        if self.journals >= 3 {
            badges.push("📘 Reflective Thinker");
        }
        badges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_badges_initially() {
        assert!(BadgeProgress::default().badges().is_empty());
    }

    #[test]
    fn test_thresholds() {
        let mut progress = BadgeProgress::default();
        for _ in 0..3 {
            progress.record_session();
            progress.record_journal();
        }
        for _ in 0..4 {
            progress.record_affirmation();
        }
        assert_eq!(progress.badges(), vec!["🌱 Calm Starter", "📘 Reflective Thinker"]);

        progress.record_affirmation();
        assert_eq!(progress.badges().len(), 3);
        assert_eq!(progress.badges()[1], "✨ Positive Soul");
    }
}
