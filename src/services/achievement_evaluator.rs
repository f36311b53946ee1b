use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::{Achievement, AchievementCondition, LessonTarget, UserAchievement},
    repositories::{AchievementRepository, LessonRepository, UserAchievementRepository},
    services::progression_ledger::ProgressionLedger,
};

/// Cumulative stats a single event is evaluated against. Assembled by the
/// orchestrator after the triggering mutation has committed, so conditions
/// see the event's own contribution.
#[derive(Clone, Debug, Default)]
pub struct StatsSnapshot {
    pub quizzes_completed: u64,
    pub completed_lesson_ids: HashSet<String>,
    pub streak: u32,
    pub has_perfect_score: bool,
    pub fastest_quiz_seconds: Option<u32>,
}

/// Walks the achievement catalog after each progression event and unlocks
/// whatever is newly satisfied, exactly once per (user, achievement).
pub struct AchievementEvaluator {
    catalog: Arc<dyn AchievementRepository>,
    unlocks: Arc<dyn UserAchievementRepository>,
    lessons: Arc<dyn LessonRepository>,
    ledger: Arc<ProgressionLedger>,
}

impl AchievementEvaluator {
    pub fn new(
        catalog: Arc<dyn AchievementRepository>,
        unlocks: Arc<dyn UserAchievementRepository>,
        lessons: Arc<dyn LessonRepository>,
        ledger: Arc<ProgressionLedger>,
    ) -> Self {
        Self {
            catalog,
            unlocks,
            lessons,
            ledger,
        }
    }

    /// Evaluate every not-yet-unlocked achievement against the snapshot.
    /// Safe to call repeatedly: unlocked achievements are skipped, and the
    /// unique unlock insert settles races so a reward is paid at most once.
    /// All conditions are checked against the snapshot as given; reward XP
    /// from one unlock does not feed the next check within the same call.
    pub async fn evaluate(
        &self,
        user_id: &str,
        snapshot: &StatsSnapshot,
    ) -> AppResult<Vec<(Achievement, UserAchievement)>> {
        let unlocked: HashSet<String> = self
            .unlocks
            .find_for_user(user_id)
            .await?
            .into_iter()
            .map(|record| record.achievement_id)
            .collect();

        let mut newly_unlocked = Vec::new();

        for achievement in self.catalog.find_all().await? {
            if unlocked.contains(&achievement.id) {
                continue;
            }

            if !Self::condition_met(&achievement.condition, snapshot, self.lessons.as_ref())
                .await?
            {
                continue;
            }

            let record = UserAchievement::new(user_id, &achievement.id);
            if !self.unlocks.insert_if_absent(record.clone()).await? {
                // A concurrent evaluation won the insert; it pays the reward.
                continue;
            }

            log::info!(
                "User '{}' unlocked achievement '{}' (+{} XP)",
                user_id,
                achievement.id,
                achievement.xp_reward
            );

            if achievement.xp_reward > 0 {
                self.ledger.apply_xp(user_id, achievement.xp_reward).await?;
            }

            newly_unlocked.push((achievement, record));
        }

        Ok(newly_unlocked)
    }

    async fn condition_met(
        condition: &AchievementCondition,
        snapshot: &StatsSnapshot,
        lessons: &dyn LessonRepository,
    ) -> AppResult<bool> {
        let met = match condition {
            AchievementCondition::QuizCompletion { count } => {
                snapshot.quizzes_completed >= *count
            }
            AchievementCondition::Streak { days } => snapshot.streak >= *days,
            AchievementCondition::QuizPerfectScore {} => snapshot.has_perfect_score,
            AchievementCondition::QuizSpeed { time_limit_seconds } => snapshot
                .fastest_quiz_seconds
                .is_some_and(|fastest| fastest <= *time_limit_seconds),
            AchievementCondition::LessonCompletion { category, count } => {
                match (category, count) {
                    (None, LessonTarget::Count(n)) => {
                        snapshot.completed_lesson_ids.len() as u64 >= *n
                    }
                    (None, LessonTarget::All) => {
                        log::warn!("lesson_completion 'all' without a category never matches");
                        false
                    }
                    (Some(category), target) => {
                        let category_ids = lessons.list_ids_by_category(category).await?;
                        let completed_in_category = category_ids
                            .iter()
                            .filter(|id| snapshot.completed_lesson_ids.contains(*id))
                            .count() as u64;
                        match target {
                            LessonTarget::Count(n) => completed_in_category >= *n,
                            LessonTarget::All => {
                                !category_ids.is_empty()
                                    && completed_in_category == category_ids.len() as u64
                            }
                        }
                    }
                }
            }
        };
        Ok(met)
    }
}
