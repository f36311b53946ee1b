#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use trainme_server::{
    errors::{AppError, AppResult},
    models::domain::{
        Achievement, LearningPath, Lesson, LessonCompletion, PathEnrollment, Quiz, QuizAttempt,
        QuizOption, QuizQuestion, User, UserAchievement,
    },
    repositories::{
        AchievementRepository, EnrollmentRepository, LearningPathRepository,
        LessonProgressRepository, LessonRepository, QuizAttemptRepository, QuizRepository,
        UserAchievementRepository, UserRepository,
    },
    services::{
        AchievementEvaluator, LeaderboardRanker, PathProgressTracker, ProgressionLedger,
        ProgressionService, StreakTracker,
    },
};

pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AppError::AlreadyExists(format!(
                "User with id '{}' already exists",
                user.id
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn update_if_version(&self, user: &User, expected_version: u64) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let stored = users.get(&user.id).ok_or_else(|| {
            AppError::NotFound(format!("User with id '{}' not found", user.id))
        })?;

        if stored.version != expected_version {
            return Ok(false);
        }

        users.insert(user.id.clone(), user.clone());
        Ok(true)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryQuizRepository {
    quizzes: HashMap<String, Quiz>,
}

impl InMemoryQuizRepository {
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.get(id).cloned())
    }
}

pub struct InMemoryLessonRepository {
    lessons: HashMap<String, Lesson>,
}

impl InMemoryLessonRepository {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons: lessons.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessonRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        Ok(self.lessons.get(id).cloned())
    }

    async fn list_ids_by_category(&self, category: &str) -> AppResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .lessons
            .values()
            .filter(|l| l.category == category)
            .map(|l| l.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

pub struct InMemoryLearningPathRepository {
    paths: HashMap<String, LearningPath>,
}

impl InMemoryLearningPathRepository {
    pub fn new(paths: Vec<LearningPath>) -> Self {
        Self {
            paths: paths.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

#[async_trait]
impl LearningPathRepository for InMemoryLearningPathRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<LearningPath>> {
        Ok(self.paths.get(id).cloned())
    }
}

pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<HashMap<String, QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;
        if attempts.contains_key(&attempt.id) {
            return Err(AppError::AlreadyExists(format!(
                "Attempt with id '{}' already exists",
                attempt.id
            )));
        }
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.get(id).cloned())
    }

    async fn claim_xp_award(&self, id: &str) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(id) {
            Some(attempt) if !attempt.xp_awarded => {
                attempt.xp_awarded = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_xp_award(&self, id: &str) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        if let Some(attempt) = attempts.get_mut(id) {
            attempt.xp_awarded = false;
        }
        Ok(())
    }

    async fn count_for_user(&self, user_id: &str) -> AppResult<u64> {
        let attempts = self.attempts.read().await;
        Ok(attempts.values().filter(|a| a.user_id == user_id).count() as u64)
    }

    async fn has_perfect_attempt(&self, user_id: &str) -> AppResult<bool> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .any(|a| a.user_id == user_id && a.is_perfect()))
    }

    async fn fastest_attempt_seconds(&self, user_id: &str) -> AppResult<Option<u32>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.time_spent_seconds)
            .min())
    }

    async fn user_ids_active_since(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<String>> {
        let attempts = self.attempts.read().await;
        let mut ids: Vec<String> = attempts
            .values()
            .filter(|a| a.completed_at >= cutoff)
            .map(|a| a.user_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryAchievementRepository {
    achievements: Vec<Achievement>,
}

impl InMemoryAchievementRepository {
    pub fn new(mut achievements: Vec<Achievement>) -> Self {
        achievements.sort_by(|a, b| a.id.cmp(&b.id));
        Self { achievements }
    }
}

#[async_trait]
impl AchievementRepository for InMemoryAchievementRepository {
    async fn find_all(&self) -> AppResult<Vec<Achievement>> {
        Ok(self.achievements.clone())
    }
}

pub struct InMemoryUserAchievementRepository {
    records: Arc<RwLock<HashMap<(String, String), UserAchievement>>>,
}

impl InMemoryUserAchievementRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserAchievementRepository for InMemoryUserAchievementRepository {
    async fn insert_if_absent(&self, record: UserAchievement) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let key = (record.user_id.clone(), record.achievement_id.clone());
        if records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, record);
        Ok(true)
    }

    async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<UserAchievement>> {
        let records = self.records.read().await;
        let mut items: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.achievement_id.cmp(&b.achievement_id));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryEnrollmentRepository {
    enrollments: Arc<RwLock<HashMap<(String, String), PathEnrollment>>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self {
            enrollments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn add_item(
        &self,
        user_id: &str,
        path_id: &str,
        item_id: &str,
        is_lesson: bool,
    ) -> AppResult<bool> {
        let mut enrollments = self.enrollments.write().await;
        let key = (user_id.to_string(), path_id.to_string());
        let enrollment = enrollments
            .entry(key)
            .or_insert_with(|| PathEnrollment::new(user_id, path_id));

        let set = if is_lesson {
            &mut enrollment.completed_lesson_ids
        } else {
            &mut enrollment.completed_quiz_ids
        };

        if set.iter().any(|id| id == item_id) {
            enrollment.last_activity_at = Utc::now();
            return Ok(false);
        }

        set.push(item_id.to_string());
        enrollment.last_activity_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn find(&self, user_id: &str, path_id: &str) -> AppResult<Option<PathEnrollment>> {
        let enrollments = self.enrollments.read().await;
        Ok(enrollments
            .get(&(user_id.to_string(), path_id.to_string()))
            .cloned())
    }

    async fn add_completed_lesson(
        &self,
        user_id: &str,
        path_id: &str,
        lesson_id: &str,
    ) -> AppResult<bool> {
        self.add_item(user_id, path_id, lesson_id, true).await
    }

    async fn add_completed_quiz(
        &self,
        user_id: &str,
        path_id: &str,
        quiz_id: &str,
    ) -> AppResult<bool> {
        self.add_item(user_id, path_id, quiz_id, false).await
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryLessonProgressRepository {
    completions: Arc<RwLock<HashMap<(String, String), LessonCompletion>>>,
}

impl InMemoryLessonProgressRepository {
    pub fn new() -> Self {
        Self {
            completions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl LessonProgressRepository for InMemoryLessonProgressRepository {
    async fn insert_completion(&self, record: LessonCompletion) -> AppResult<bool> {
        let mut completions = self.completions.write().await;
        let key = (record.user_id.clone(), record.lesson_id.clone());
        if completions.contains_key(&key) {
            return Ok(false);
        }
        completions.insert(key, record);
        Ok(true)
    }

    async fn completed_lesson_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let completions = self.completions.read().await;
        let mut ids: Vec<String> = completions
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.lesson_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

// ---- fixtures -------------------------------------------------------------

pub fn make_quiz(id: &str, category: &str, question_count: usize) -> Quiz {
    let questions = (1..=question_count)
        .map(|n| QuizQuestion {
            id: format!("{}-q{}", id, n),
            prompt: format!("Question {}", n),
            options: vec![
                QuizOption {
                    id: format!("{}-q{}-right", id, n),
                    text: "right".to_string(),
                    correct: true,
                },
                QuizOption {
                    id: format!("{}-q{}-wrong", id, n),
                    text: "wrong".to_string(),
                    correct: false,
                },
            ],
            order: n as i16,
        })
        .collect();

    Quiz {
        id: id.to_string(),
        title: format!("Quiz {}", id),
        category: category.to_string(),
        questions,
        created_at: Some(Utc::now()),
    }
}

pub fn make_lesson(id: &str, category: &str, xp_reward: u64) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: format!("Lesson {}", id),
        category: category.to_string(),
        xp_reward,
    }
}

pub fn make_path(id: &str, lesson_ids: &[&str], quiz_ids: &[&str]) -> LearningPath {
    LearningPath {
        id: id.to_string(),
        title: format!("Path {}", id),
        lesson_ids: lesson_ids.iter().map(|s| s.to_string()).collect(),
        quiz_ids: quiz_ids.iter().map(|s| s.to_string()).collect(),
    }
}

/// All repositories plus the fully-wired service stack, over a seeded
/// catalog. Mirrors the wiring in `AppState::new`.
pub struct TestHarness {
    pub users: Arc<InMemoryUserRepository>,
    pub attempts: Arc<InMemoryQuizAttemptRepository>,
    pub unlocks: Arc<InMemoryUserAchievementRepository>,
    pub enrollments: Arc<InMemoryEnrollmentRepository>,
    pub lesson_progress: Arc<InMemoryLessonProgressRepository>,
    pub service: ProgressionService,
    pub leaderboard: LeaderboardRanker,
}

impl TestHarness {
    pub fn new(
        quizzes: Vec<Quiz>,
        lessons: Vec<Lesson>,
        paths: Vec<LearningPath>,
        achievements: Vec<Achievement>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let attempts = Arc::new(InMemoryQuizAttemptRepository::new());
        let unlocks = Arc::new(InMemoryUserAchievementRepository::new());
        let enrollments = Arc::new(InMemoryEnrollmentRepository::new());
        let lesson_progress = Arc::new(InMemoryLessonProgressRepository::new());

        let quiz_repo = Arc::new(InMemoryQuizRepository::new(quizzes));
        let lesson_repo = Arc::new(InMemoryLessonRepository::new(lessons));
        let path_repo = Arc::new(InMemoryLearningPathRepository::new(paths));
        let achievement_repo = Arc::new(InMemoryAchievementRepository::new(achievements));

        let ledger = Arc::new(ProgressionLedger::new(users.clone(), 5));
        let streaks = Arc::new(StreakTracker::new(users.clone(), 5));
        let evaluator = Arc::new(AchievementEvaluator::new(
            achievement_repo.clone(),
            unlocks.clone(),
            lesson_repo.clone(),
            ledger.clone(),
        ));
        let path_progress = Arc::new(PathProgressTracker::new(path_repo, enrollments.clone()));
        let leaderboard = LeaderboardRanker::new(users.clone(), attempts.clone());

        let service = ProgressionService::new(
            users.clone(),
            quiz_repo,
            lesson_repo,
            attempts.clone(),
            lesson_progress.clone(),
            achievement_repo,
            unlocks.clone(),
            ledger,
            streaks,
            evaluator,
            path_progress,
            10,
        );

        Self {
            users,
            attempts,
            unlocks,
            enrollments,
            lesson_progress,
            service,
            leaderboard,
        }
    }

    pub async fn seed_user(&self, id: &str, display_name: &str) -> User {
        self.service
            .register_user(id, display_name)
            .await
            .expect("user registration should succeed")
    }
}
