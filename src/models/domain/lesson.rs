use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lesson catalog entry, read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub category: String,
    pub xp_reward: u64,
}

/// Marks a lesson as completed by a user. At most one record exists per
/// (user_id, lesson_id) pair; the first insert is what awards the lesson XP.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LessonCompletion {
    pub user_id: String,
    pub lesson_id: String,
    pub completed_at: DateTime<Utc>,
}

impl LessonCompletion {
    pub fn new(user_id: &str, lesson_id: &str) -> Self {
        LessonCompletion {
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            completed_at: Utc::now(),
        }
    }
}
