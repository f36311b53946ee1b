use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Learning path catalog entry: an ordered curriculum of lessons and quizzes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    pub lesson_ids: Vec<String>,
    pub quiz_ids: Vec<String>,
}

impl LearningPath {
    pub fn total_items(&self) -> usize {
        self.lesson_ids.len() + self.quiz_ids.len()
    }
}

/// A user's progress record against one learning path. The completed-id
/// vectors carry set semantics: ids are unique and insertion is a no-op when
/// the id is already present.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathEnrollment {
    pub user_id: String,
    pub path_id: String,
    // Defaults cover upsert-created documents where only one of the two
    // arrays exists yet.
    #[serde(default)]
    pub completed_lesson_ids: Vec<String>,
    #[serde(default)]
    pub completed_quiz_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl PathEnrollment {
    pub fn new(user_id: &str, path_id: &str) -> Self {
        let now = Utc::now();
        PathEnrollment {
            user_id: user_id.to_string(),
            path_id: path_id.to_string(),
            completed_lesson_ids: Vec::new(),
            completed_quiz_ids: Vec::new(),
            started_at: now,
            last_activity_at: now,
        }
    }

    pub fn completed_items(&self) -> usize {
        self.completed_lesson_ids.len() + self.completed_quiz_ids.len()
    }
}
