use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1))]
    pub question_id: String,

    #[validate(length(min = 1))]
    pub chosen_option_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitQuizAttemptRequest {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(length(min = 1))]
    pub quiz_id: String,

    #[validate(nested)]
    pub answers: Vec<AnswerInput>,

    pub time_spent_seconds: u32,

    /// Learning path this quiz was taken inside of, if any.
    pub path_id: Option<String>,

    /// Client-generated idempotency key. Re-submitting with the same id
    /// returns the stored outcome instead of awarding XP again.
    pub attempt_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteLessonRequest {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(length(min = 1))]
    pub lesson_id: String,

    pub path_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeaderboardQuery {
    pub timeframe: Option<String>,

    #[validate(range(min = 1))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

impl LeaderboardQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}
