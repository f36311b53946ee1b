use std::collections::{HashMap, HashSet};

use crate::errors::{AppError, AppResult};
use crate::models::domain::{AnswerRecord, Quiz};
use crate::models::dto::request::AnswerInput;

/// Result of grading one submission against the quiz definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradedSubmission {
    pub raw_score: u32,
    pub total_questions: u32,
    pub xp_earned: u64,
    pub answers: Vec<AnswerRecord>,
}

/// Pure grading logic: no lookups beyond the quiz passed in, no side
/// effects. Persistence and XP application belong to the orchestrator.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Grade submitted answers against the quiz. Unanswered questions count
    /// as incorrect; the denominator is always the quiz's question count.
    pub fn grade(
        quiz: &Quiz,
        submitted_answers: &[AnswerInput],
        xp_per_correct: u64,
    ) -> AppResult<GradedSubmission> {
        let question_map: HashMap<&str, _> = quiz
            .questions
            .iter()
            .map(|q| (q.id.as_str(), q))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut raw_score: u32 = 0;
        let mut answers = Vec::with_capacity(submitted_answers.len());

        for submitted in submitted_answers {
            let question = question_map
                .get(submitted.question_id.as_str())
                .ok_or_else(|| {
                    AppError::InvalidSubmission(format!(
                        "Question '{}' is not part of quiz '{}'",
                        submitted.question_id, quiz.id
                    ))
                })?;

            if !seen.insert(submitted.question_id.as_str()) {
                return Err(AppError::InvalidSubmission(format!(
                    "Question '{}' answered more than once",
                    submitted.question_id
                )));
            }

            if !question.has_option(&submitted.chosen_option_id) {
                return Err(AppError::InvalidSubmission(format!(
                    "Option '{}' does not belong to question '{}'",
                    submitted.chosen_option_id, submitted.question_id
                )));
            }

            let is_correct = question.correct_option_id() == Some(submitted.chosen_option_id.as_str());
            if is_correct {
                raw_score += 1;
            }

            answers.push(AnswerRecord {
                question_id: submitted.question_id.clone(),
                chosen_option_id: submitted.chosen_option_id.clone(),
                is_correct,
            });
        }

        Ok(GradedSubmission {
            raw_score,
            total_questions: quiz.questions.len() as u32,
            xp_earned: raw_score as u64 * xp_per_correct,
            answers,
        })
    }
}
