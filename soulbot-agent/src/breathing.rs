//! Breathing exercise timing

use std::fmt;
use std::str::FromStr;

/// One step of a breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathingPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BreathingPhase::Inhale => "Inhale",
            BreathingPhase::Hold => "Hold",
            BreathingPhase::Exhale => "Exhale",
        }
    }
}

impl fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Guided breathing styles, timed in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreathingPattern {
    /// 4s in, 4s out
    #[default]
    Calm,
    /// 4-7-8 breathing
    DeepRelax,
    /// 4s in, 4s hold, 4s out
    Box,
}

impl BreathingPattern {
    pub const ALL: [BreathingPattern; 3] = [
        BreathingPattern::Calm,
        BreathingPattern::DeepRelax,
        BreathingPattern::Box,
    ];

    /// `(inhale, hold, exhale)` in seconds
    pub fn timing(&self) -> (u64, u64, u64) {
        match self {
            BreathingPattern::Calm => (4, 0, 4),
            BreathingPattern::DeepRelax => (4, 7, 8),
            BreathingPattern::Box => (4, 4, 4),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BreathingPattern::Calm => "Calm Breathing",
            BreathingPattern::DeepRelax => "Deep Relax (4-7-8)",
            BreathingPattern::Box => "Box Breathing",
        }
    }

    /// Length of one full cycle
    pub fn total_secs(&self) -> u64 {
        let (inhale, hold, exhale) = self.timing();
        inhale + hold + exhale
    }

    /// Phases of one cycle with their durations; a zero hold is skipped
    pub fn phases(&self) -> Vec<(BreathingPhase, u64)> {
        let (inhale, hold, exhale) = self.timing();
        let mut phases = vec![(BreathingPhase::Inhale, inhale)];
        if hold > 0 {
            phases.push((BreathingPhase::Hold, hold));
        }
        phases.push((BreathingPhase::Exhale, exhale));
        phases
    }

    /// Whole cycles that fit in `seconds`, at least one
    pub fn cycles_for(&self, seconds: u64) -> u64 {
        (seconds / self.total_secs().max(1)).max(1)
    }

    /// Animation keyframes as whole percentages of a cycle: end of inhale
    /// and end of hold
    pub fn keyframes(&self) -> (u64, u64) {
        let (inhale, hold, _) = self.timing();
        let total = self.total_secs().max(1);
        (inhale * 100 / total, (inhale + hold) * 100 / total)
    }
}

impl fmt::Display for BreathingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreathingPattern {
    type Err = soulbot_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calm" => Ok(BreathingPattern::Calm),
            "relax" | "deep" | "deep-relax" | "478" | "4-7-8" => Ok(BreathingPattern::DeepRelax),
            "box" => Ok(BreathingPattern::Box),
            other => Err(soulbot_core::Error::Validation(format!(
                "unknown breathing style '{}' (expected calm, relax or box)",
                other
            ))),
        }
    }
}
