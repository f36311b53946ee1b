use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{LessonCompletion, ProgressionEvent, QuizAttempt, User},
    models::dto::request::{CompleteLessonRequest, SubmitQuizAttemptRequest},
    models::dto::response::{
        LessonCompletionOutcome, PathProgressResponse, QuizAttemptOutcome, UnlockedAchievementDto,
        UserStatsResponse,
    },
    repositories::{
        AchievementRepository, LessonProgressRepository, LessonRepository, QuizAttemptRepository,
        QuizRepository, UserAchievementRepository, UserRepository,
    },
    services::{
        achievement_evaluator::{AchievementEvaluator, StatsSnapshot},
        path_progress::PathProgressTracker,
        progression_ledger::ProgressionLedger,
        score_calculator::ScoreCalculator,
        streak_tracker::StreakTracker,
    },
};

/// Public entry point of the progression core. Each inbound event runs the
/// same pipeline: grade, apply XP, update streak, update path progress,
/// evaluate achievements, report what changed.
pub struct ProgressionService {
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    lessons: Arc<dyn LessonRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    lesson_progress: Arc<dyn LessonProgressRepository>,
    achievements: Arc<dyn AchievementRepository>,
    unlocks: Arc<dyn UserAchievementRepository>,
    ledger: Arc<ProgressionLedger>,
    streaks: Arc<StreakTracker>,
    evaluator: Arc<AchievementEvaluator>,
    path_progress: Arc<PathProgressTracker>,
    xp_per_correct: u64,
}

impl ProgressionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        quizzes: Arc<dyn QuizRepository>,
        lessons: Arc<dyn LessonRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        lesson_progress: Arc<dyn LessonProgressRepository>,
        achievements: Arc<dyn AchievementRepository>,
        unlocks: Arc<dyn UserAchievementRepository>,
        ledger: Arc<ProgressionLedger>,
        streaks: Arc<StreakTracker>,
        evaluator: Arc<AchievementEvaluator>,
        path_progress: Arc<PathProgressTracker>,
        xp_per_correct: u64,
    ) -> Self {
        Self {
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
            xp_per_correct,
        }
    }

    /// Idempotent user bootstrap, called by the auth boundary on first
    /// authentication.
    pub async fn register_user(&self, user_id: &str, display_name: &str) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_id(user_id).await? {
            return Ok(existing);
        }
        let user = User::new(user_id, display_name);
        self.users.create(user.clone()).await?;
        log::info!("Registered user '{}'", user_id);
        Ok(user)
    }

    pub async fn submit_quiz_attempt(
        &self,
        request: SubmitQuizAttemptRequest,
    ) -> AppResult<QuizAttemptOutcome> {
        request.validate()?;

        let user_before = self.load_user(&request.user_id).await?;
        let quiz = self
            .quizzes
            .find_by_id(&request.quiz_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Quiz with id '{}' not found", request.quiz_id))
            })?;

        // Membership problems must surface before anything is recorded.
        if let Some(path_id) = &request.path_id {
            self.path_progress
                .ensure_quiz_in_path(path_id, &request.quiz_id)
                .await?;
        }

        // An already-recorded submission either replays its stored outcome
        // or, when the award never went through, finishes the pipeline.
        if let Some(attempt_id) = &request.attempt_id {
            if let Some(existing) = self.attempts.find_by_id(attempt_id).await? {
                return self.resume_or_replay(&request, &user_before, existing).await;
            }
        }

        let graded = ScoreCalculator::grade(&quiz, &request.answers, self.xp_per_correct)?;

        let attempt = QuizAttempt {
            id: request
                .attempt_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: request.user_id.clone(),
            quiz_id: request.quiz_id.clone(),
            answers: graded.answers.clone(),
            raw_score: graded.raw_score,
            total_questions: graded.total_questions,
            time_spent_seconds: request.time_spent_seconds,
            xp_earned: graded.xp_earned,
            xp_awarded: false,
            completed_at: Utc::now(),
        };

        let attempt = match self.attempts.create(attempt).await {
            Ok(attempt) => attempt,
            // Two in-flight submissions with the same attempt id: the loser
            // resumes or replays the winner's record.
            Err(AppError::AlreadyExists(_)) => {
                let attempt_id = request
                    .attempt_id
                    .clone()
                    .ok_or_else(|| AppError::InternalError("Duplicate generated attempt id".into()))?;
                let existing = self
                    .attempts
                    .find_by_id(&attempt_id)
                    .await?
                    .ok_or_else(|| AppError::InternalError("Lost attempt record".into()))?;
                return self.resume_or_replay(&request, &user_before, existing).await;
            }
            Err(err) => return Err(err),
        };

        if !self.attempts.claim_xp_award(&attempt.id).await? {
            // A concurrent duplicate claimed the award first.
            return self.replay_attempt(&request, attempt).await;
        }

        self.award_attempt(&request, &user_before, attempt).await
    }

    pub async fn complete_lesson(
        &self,
        request: CompleteLessonRequest,
    ) -> AppResult<LessonCompletionOutcome> {
        request.validate()?;

        let user_before = self.load_user(&request.user_id).await?;
        let lesson = self
            .lessons
            .find_by_id(&request.lesson_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Lesson with id '{}' not found", request.lesson_id))
            })?;

        // Membership problems must surface before the completion is durable.
        if let Some(path_id) = &request.path_id {
            self.path_progress
                .ensure_lesson_in_path(path_id, &request.lesson_id)
                .await?;
        }

        let newly_completed = self
            .lesson_progress
            .insert_completion(LessonCompletion::new(&request.user_id, &request.lesson_id))
            .await?;

        // Path membership is tracked even when the lesson was already
        // completed globally, e.g. enrolling in a path after the fact.
        if let Some(path_id) = &request.path_id {
            self.path_progress
                .mark_lesson_complete(&request.user_id, path_id, &request.lesson_id)
                .await?;
        }

        if !newly_completed {
            return Ok(LessonCompletionOutcome {
                lesson_id: lesson.id,
                xp_earned: 0,
                new_total_xp: user_before.total_xp,
                new_level: user_before.level,
                leveled_up: false,
                streak: user_before.streak,
                newly_unlocked_achievements: Vec::new(),
                events: Vec::new(),
            });
        }

        let mut events = Vec::new();

        let applied = self
            .ledger
            .apply_xp(&request.user_id, lesson.xp_reward)
            .await?;
        events.push(ProgressionEvent::XpChanged {
            user_id: request.user_id.clone(),
            delta: lesson.xp_reward,
            total_xp: applied.total_xp,
        });
        if applied.leveled_up {
            events.push(ProgressionEvent::LevelUp {
                user_id: request.user_id.clone(),
                level: applied.level,
            });
        }

        let streak_state = self
            .streaks
            .record_activity(&request.user_id, Utc::now().date_naive())
            .await?;
        if streak_state.streak != user_before.streak {
            events.push(ProgressionEvent::StreakChanged {
                user_id: request.user_id.clone(),
                streak: streak_state.streak,
            });
        }

        let snapshot = self
            .stats_snapshot(&request.user_id, streak_state.streak)
            .await?;
        let newly_unlocked = self.evaluator.evaluate(&request.user_id, &snapshot).await?;
        for (achievement, _) in &newly_unlocked {
            events.push(ProgressionEvent::AchievementUnlocked {
                user_id: request.user_id.clone(),
                achievement_id: achievement.id.clone(),
            });
        }

        let user_after = self.load_user(&request.user_id).await?;

        Ok(LessonCompletionOutcome {
            lesson_id: lesson.id,
            xp_earned: lesson.xp_reward,
            new_total_xp: user_after.total_xp,
            new_level: user_after.level,
            leveled_up: user_after.level > user_before.level,
            streak: streak_state.streak,
            newly_unlocked_achievements: newly_unlocked
                .iter()
                .map(|(achievement, record)| {
                    UnlockedAchievementDto::from_parts(achievement, record)
                })
                .collect(),
            events,
        })
    }

    pub async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStatsResponse> {
        let user = self.load_user(user_id).await?;

        let catalog: HashMap<String, _> = self
            .achievements
            .find_all()
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let achievements_unlocked = self
            .unlocks
            .find_for_user(user_id)
            .await?
            .iter()
            .filter_map(|record| {
                catalog
                    .get(&record.achievement_id)
                    .map(|achievement| UnlockedAchievementDto::from_parts(achievement, record))
            })
            .collect();

        Ok(UserStatsResponse {
            user_id: user.id,
            display_name: user.display_name,
            total_xp: user.total_xp,
            level: user.level,
            streak: user.streak,
            achievements_unlocked,
        })
    }

    pub async fn get_user_progress(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> AppResult<PathProgressResponse> {
        self.load_user(user_id).await?;
        self.path_progress.get_progress(user_id, path_id).await
    }

    async fn load_user(&self, user_id: &str) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))
    }

    /// A stored attempt id was hit again. If its XP was never credited,
    /// claim the award and finish the pipeline; otherwise hand back the
    /// stored outcome.
    async fn resume_or_replay(
        &self,
        request: &SubmitQuizAttemptRequest,
        user_before: &User,
        existing: QuizAttempt,
    ) -> AppResult<QuizAttemptOutcome> {
        if existing.user_id != request.user_id || existing.quiz_id != request.quiz_id {
            return Err(AppError::AlreadyExists(format!(
                "Attempt id '{}' was recorded for a different submission",
                existing.id
            )));
        }

        if existing.xp_awarded || !self.attempts.claim_xp_award(&existing.id).await? {
            return self.replay_attempt(request, existing).await;
        }

        log::info!(
            "Attempt '{}' was recorded but never rewarded, finishing the award",
            existing.id
        );
        self.award_attempt(request, user_before, existing).await
    }

    /// Runs the post-record pipeline while holding the award claim. On
    /// failure the claim is released so a later retry can finish the credit
    /// instead of replaying an outcome that never awarded anything.
    async fn award_attempt(
        &self,
        request: &SubmitQuizAttemptRequest,
        user_before: &User,
        attempt: QuizAttempt,
    ) -> AppResult<QuizAttemptOutcome> {
        match self
            .apply_attempt_rewards(request, user_before, &attempt)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(release_err) = self.attempts.release_xp_award(&attempt.id).await {
                    log::error!(
                        "Could not release award claim for attempt '{}': {}",
                        attempt.id,
                        release_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn apply_attempt_rewards(
        &self,
        request: &SubmitQuizAttemptRequest,
        user_before: &User,
        attempt: &QuizAttempt,
    ) -> AppResult<QuizAttemptOutcome> {
        let mut events = Vec::new();

        let applied = self
            .ledger
            .apply_xp(&request.user_id, attempt.xp_earned)
            .await?;
        events.push(ProgressionEvent::XpChanged {
            user_id: request.user_id.clone(),
            delta: attempt.xp_earned,
            total_xp: applied.total_xp,
        });
        if applied.leveled_up {
            events.push(ProgressionEvent::LevelUp {
                user_id: request.user_id.clone(),
                level: applied.level,
            });
        }

        let streak_state = self
            .streaks
            .record_activity(&request.user_id, attempt.completed_at.date_naive())
            .await?;
        if streak_state.streak != user_before.streak {
            events.push(ProgressionEvent::StreakChanged {
                user_id: request.user_id.clone(),
                streak: streak_state.streak,
            });
        }

        if let Some(path_id) = &request.path_id {
            self.path_progress
                .mark_quiz_complete(&request.user_id, path_id, &request.quiz_id)
                .await?;
        }

        let snapshot = self
            .stats_snapshot(&request.user_id, streak_state.streak)
            .await?;
        let newly_unlocked = self.evaluator.evaluate(&request.user_id, &snapshot).await?;
        for (achievement, _) in &newly_unlocked {
            events.push(ProgressionEvent::AchievementUnlocked {
                user_id: request.user_id.clone(),
                achievement_id: achievement.id.clone(),
            });
        }

        // Reload so the reported totals include achievement rewards.
        let user_after = self.load_user(&request.user_id).await?;

        Ok(QuizAttemptOutcome {
            attempt_id: attempt.id.clone(),
            score: attempt.raw_score,
            total_questions: attempt.total_questions,
            xp_earned: attempt.xp_earned,
            new_total_xp: user_after.total_xp,
            new_level: user_after.level,
            leveled_up: user_after.level > user_before.level,
            streak: streak_state.streak,
            newly_unlocked_achievements: newly_unlocked
                .iter()
                .map(|(achievement, record)| {
                    UnlockedAchievementDto::from_parts(achievement, record)
                })
                .collect(),
            events,
        })
    }

    async fn replay_attempt(
        &self,
        request: &SubmitQuizAttemptRequest,
        existing: QuizAttempt,
    ) -> AppResult<QuizAttemptOutcome> {
        if existing.user_id != request.user_id || existing.quiz_id != request.quiz_id {
            return Err(AppError::AlreadyExists(format!(
                "Attempt id '{}' was recorded for a different submission",
                existing.id
            )));
        }

        let user = self.load_user(&request.user_id).await?;
        log::info!(
            "Replaying stored outcome for attempt '{}' of user '{}'",
            existing.id,
            request.user_id
        );

        Ok(QuizAttemptOutcome {
            attempt_id: existing.id,
            score: existing.raw_score,
            total_questions: existing.total_questions,
            xp_earned: existing.xp_earned,
            new_total_xp: user.total_xp,
            new_level: user.level,
            leveled_up: false,
            streak: user.streak,
            newly_unlocked_achievements: Vec::new(),
            events: Vec::new(),
        })
    }

    async fn stats_snapshot(&self, user_id: &str, streak: u32) -> AppResult<StatsSnapshot> {
        let quizzes_completed = self.attempts.count_for_user(user_id).await?;
        let completed_lesson_ids = self
            .lesson_progress
            .completed_lesson_ids(user_id)
            .await?
            .into_iter()
            .collect();
        let has_perfect_score = self.attempts.has_perfect_attempt(user_id).await?;
        let fastest_quiz_seconds = self.attempts.fastest_attempt_seconds(user_id).await?;

        Ok(StatsSnapshot {
            quizzes_completed,
            completed_lesson_ids,
            streak,
            has_perfect_score,
            fastest_quiz_seconds,
        })
    }
}
