//! Mood vocabulary shared by the journal and its stores.

use serde::{Deserialize, Serialize};

/// One of the moods a user can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Tired,
    Calm,
    Anxious,
    Excited,
    Neutral,
}

impl Mood {
    /// Every mood, in display order.
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Tired,
        Mood::Calm,
        Mood::Anxious,
        Mood::Excited,
        Mood::Neutral,
    ];

    /// Emoji shown next to the mood.
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😡",
            Mood::Tired => "😴",
            Mood::Calm => "😌",
            Mood::Anxious => "😨",
            Mood::Excited => "🤩",
            Mood::Neutral => "😐",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
            Mood::Calm => "Calm",
            Mood::Anxious => "Anxious",
            Mood::Excited => "Excited",
            Mood::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_mood_once() {
        assert_eq!(Mood::ALL.len(), 8);
        for (i, mood) in Mood::ALL.iter().enumerate() {
            assert!(!Mood::ALL[..i].contains(mood));
        }
    }

    #[test]
    fn display_matches_label() {
        assert_eq!(Mood::Happy.to_string(), "Happy");
        assert_eq!(Mood::Anxious.to_string(), "Anxious");
    }

    #[test]
    fn serializes_as_variant_name() {
        let json = serde_json::to_string(&Mood::Calm).expect("serialize");
        assert_eq!(json, "\"Calm\"");
        let back: Mood = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Mood::Calm);
    }
}
