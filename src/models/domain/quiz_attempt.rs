use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One graded quiz submission. A row is written exactly once per
/// submission; the `id` doubles as the de-duplication key for retried
/// submissions. The only mutable bit is `xp_awarded`, the claim flag that
/// marks whether the attempt's XP has been credited.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub answers: Vec<AnswerRecord>,
    pub raw_score: u32,
    pub total_questions: u32,
    pub time_spent_seconds: u32,
    pub xp_earned: u64,
    #[serde(default)]
    pub xp_awarded: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub chosen_option_id: String,
    pub is_correct: bool,
}

impl QuizAttempt {
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.raw_score == self.total_questions
    }
}
