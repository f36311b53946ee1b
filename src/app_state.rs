use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        EnrollmentRepository, LessonProgressRepository, MongoAchievementRepository,
        MongoEnrollmentRepository, MongoLearningPathRepository, MongoLessonProgressRepository,
        MongoLessonRepository, MongoQuizAttemptRepository, MongoQuizRepository,
        MongoUserAchievementRepository, MongoUserRepository, QuizAttemptRepository,
        UserAchievementRepository, UserRepository,
    },
    services::{
        AchievementEvaluator, LeaderboardRanker, PathProgressTracker, ProgressionLedger,
        ProgressionService, StreakTracker,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub progression_service: Arc<ProgressionService>,
    pub leaderboard: Arc<LeaderboardRanker>,
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;

        let attempts = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempts.ensure_indexes().await?;

        let unlocks = Arc::new(MongoUserAchievementRepository::new(&db));
        unlocks.ensure_indexes().await?;

        let enrollments = Arc::new(MongoEnrollmentRepository::new(&db));
        enrollments.ensure_indexes().await?;

        let lesson_progress = Arc::new(MongoLessonProgressRepository::new(&db));
        lesson_progress.ensure_indexes().await?;

        let quizzes = Arc::new(MongoQuizRepository::new(&db));
        let lessons = Arc::new(MongoLessonRepository::new(&db));
        let paths = Arc::new(MongoLearningPathRepository::new(&db));
        let achievements = Arc::new(MongoAchievementRepository::new(&db));

        let ledger = Arc::new(ProgressionLedger::new(
            users.clone(),
            config.max_write_retries,
        ));
        let streaks = Arc::new(StreakTracker::new(users.clone(), config.max_write_retries));
        let evaluator = Arc::new(AchievementEvaluator::new(
            achievements.clone(),
            unlocks.clone(),
            lessons.clone(),
            ledger.clone(),
        ));
        let path_progress = Arc::new(PathProgressTracker::new(paths, enrollments));
        let leaderboard = Arc::new(LeaderboardRanker::new(users.clone(), attempts.clone()));

        let progression_service = Arc::new(ProgressionService::new(
            users,
            quizzes,
            lessons,
            attempts,
            lesson_progress,
            achievements,
            unlocks,
            ledger,
            streaks,
            evaluator,
            path_progress,
            config.xp_per_correct_answer,
        ));

        Ok(Self {
            progression_service,
            leaderboard,
            db,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
