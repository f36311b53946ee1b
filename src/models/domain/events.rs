use serde::{Deserialize, Serialize};

/// Domain events emitted by a progression operation. The core stays
/// synchronous: events are collected per operation and handed back to the
/// caller, and a notification transport may fan them out from there.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionEvent {
    XpChanged {
        user_id: String,
        delta: u64,
        total_xp: u64,
    },
    LevelUp {
        user_id: String,
        level: u32,
    },
    StreakChanged {
        user_id: String,
        streak: u32,
    },
    AchievementUnlocked {
        user_id: String,
        achievement_id: String,
    },
}
