use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::LearningPath,
    models::dto::response::PathProgressResponse,
    repositories::{EnrollmentRepository, LearningPathRepository},
};

/// Tracks which lessons/quizzes of a path enrollment are done and derives
/// percent-complete. Awards no XP itself; that flows through the ledger via
/// the event that triggered the mark.
pub struct PathProgressTracker {
    paths: Arc<dyn LearningPathRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl PathProgressTracker {
    pub fn new(
        paths: Arc<dyn LearningPathRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self { paths, enrollments }
    }

    async fn load_path(&self, path_id: &str) -> AppResult<LearningPath> {
        self.paths
            .find_by_id(path_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Learning path '{}' not found", path_id)))
    }

    /// Checks catalog membership without touching any state, so callers can
    /// reject a bad request before their own writes.
    pub async fn ensure_lesson_in_path(&self, path_id: &str, lesson_id: &str) -> AppResult<()> {
        let path = self.load_path(path_id).await?;
        if !path.lesson_ids.iter().any(|id| id == lesson_id) {
            return Err(AppError::InvalidSubmission(format!(
                "Lesson '{}' is not part of path '{}'",
                lesson_id, path_id
            )));
        }
        Ok(())
    }

    pub async fn ensure_quiz_in_path(&self, path_id: &str, quiz_id: &str) -> AppResult<()> {
        let path = self.load_path(path_id).await?;
        if !path.quiz_ids.iter().any(|id| id == quiz_id) {
            return Err(AppError::InvalidSubmission(format!(
                "Quiz '{}' is not part of path '{}'",
                quiz_id, path_id
            )));
        }
        Ok(())
    }

    /// Idempotent set-add; returns whether the lesson was newly marked.
    pub async fn mark_lesson_complete(
        &self,
        user_id: &str,
        path_id: &str,
        lesson_id: &str,
    ) -> AppResult<bool> {
        self.ensure_lesson_in_path(path_id, lesson_id).await?;
        self.enrollments
            .add_completed_lesson(user_id, path_id, lesson_id)
            .await
    }

    /// Idempotent set-add; returns whether the quiz was newly marked.
    pub async fn mark_quiz_complete(
        &self,
        user_id: &str,
        path_id: &str,
        quiz_id: &str,
    ) -> AppResult<bool> {
        self.ensure_quiz_in_path(path_id, quiz_id).await?;
        self.enrollments
            .add_completed_quiz(user_id, path_id, quiz_id)
            .await
    }

    pub async fn get_progress(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> AppResult<PathProgressResponse> {
        let path = self.load_path(path_id).await?;
        let enrollment = self.enrollments.find(user_id, path_id).await?;

        let (completed_lesson_ids, completed_quiz_ids) = match enrollment {
            Some(e) => (e.completed_lesson_ids, e.completed_quiz_ids),
            None => (Vec::new(), Vec::new()),
        };

        Ok(PathProgressResponse {
            path_id: path.id.clone(),
            percent_complete: percent_complete(
                completed_lesson_ids.len() + completed_quiz_ids.len(),
                path.total_items(),
            ),
            completed_lessons: completed_lesson_ids.len(),
            total_lessons: path.lesson_ids.len(),
            completed_quizzes: completed_quiz_ids.len(),
            total_quizzes: path.quiz_ids.len(),
            completed_lesson_ids,
            completed_quiz_ids,
        })
    }
}

/// Percent of path items completed, clamped to [0, 100]. An empty path is
/// 0% complete rather than a division by zero.
pub fn percent_complete(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((completed as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}
