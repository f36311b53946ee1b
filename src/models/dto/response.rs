use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Achievement, ProgressionEvent, UserAchievement};

#[derive(Debug, Clone, Serialize)]
pub struct UnlockedAchievementDto {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub xp_reward: u64,
    pub unlocked_at: DateTime<Utc>,
}

impl UnlockedAchievementDto {
    pub fn from_parts(achievement: &Achievement, record: &UserAchievement) -> Self {
        UnlockedAchievementDto {
            id: achievement.id.clone(),
            title: achievement.title.clone(),
            icon: achievement.icon.clone(),
            xp_reward: achievement.xp_reward,
            unlocked_at: record.unlocked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizAttemptOutcome {
    pub attempt_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub xp_earned: u64,
    pub new_total_xp: u64,
    pub new_level: u32,
    pub leveled_up: bool,
    pub streak: u32,
    pub newly_unlocked_achievements: Vec<UnlockedAchievementDto>,
    pub events: Vec<ProgressionEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonCompletionOutcome {
    pub lesson_id: String,
    /// Zero when the lesson had already been completed; XP is only awarded
    /// on the first completion.
    pub xp_earned: u64,
    pub new_total_xp: u64,
    pub new_level: u32,
    pub leveled_up: bool,
    pub streak: u32,
    pub newly_unlocked_achievements: Vec<UnlockedAchievementDto>,
    pub events: Vec<ProgressionEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub user_id: String,
    pub display_name: String,
    pub total_xp: u64,
    pub level: u32,
    pub streak: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub timeframe: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathProgressResponse {
    pub path_id: String,
    pub percent_complete: f64,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub completed_quizzes: usize,
    pub total_quizzes: usize,
    pub completed_lesson_ids: Vec<String>,
    pub completed_quiz_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatsResponse {
    pub user_id: String,
    pub display_name: String,
    pub total_xp: u64,
    pub level: u32,
    pub streak: u32,
    pub achievements_unlocked: Vec<UnlockedAchievementDto>,
}
