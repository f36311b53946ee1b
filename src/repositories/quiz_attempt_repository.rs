use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::QuizAttempt,
};

/// Log of graded submissions. The unique index on `id` is what makes
/// retried submissions safe: the second insert of the same attempt id fails
/// instead of double-recording. The `xp_awarded` claim flag is the only
/// field written after insert; it settles which caller credits the XP.
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    /// Atomically flips `xp_awarded` from false to true. Returns `Ok(true)`
    /// only for the caller that flipped it.
    async fn claim_xp_award(&self, id: &str) -> AppResult<bool>;
    /// Drops a claim whose award pipeline failed, so a later retry can
    /// finish the credit.
    async fn release_xp_award(&self, id: &str) -> AppResult<()>;
    async fn count_for_user(&self, user_id: &str) -> AppResult<u64>;
    async fn has_perfect_attempt(&self, user_id: &str) -> AppResult<bool>;
    async fn fastest_attempt_seconds(&self, user_id: &str) -> AppResult<Option<u32>>;
    /// Distinct user ids with at least one attempt completed at or after the
    /// cutoff. Drives the weekly/monthly leaderboard candidate filter.
    async fn user_ids_active_since(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<String>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self { collection }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Attempt with id '{}' already exists",
                attempt.id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn claim_xp_award(&self, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                // $ne also matches records written before the flag existed
                doc! { "id": id, "xp_awarded": { "$ne": true } },
                doc! { "$set": { "xp_awarded": true } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn release_xp_award(&self, id: &str) -> AppResult<()> {
        self.collection
            .update_one(doc! { "id": id }, doc! { "$set": { "xp_awarded": false } })
            .await?;
        Ok(())
    }

    async fn count_for_user(&self, user_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "user_id": user_id })
            .await?;
        Ok(count)
    }

    async fn has_perfect_attempt(&self, user_id: &str) -> AppResult<bool> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "total_questions": { "$gt": 0 },
                "$expr": { "$eq": ["$raw_score", "$total_questions"] },
            })
            .await?;
        Ok(attempt.is_some())
    }

    async fn fastest_attempt_seconds(&self, user_id: &str) -> AppResult<Option<u32>> {
        let attempt = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .sort(doc! { "time_spent_seconds": 1 })
            .await?;
        Ok(attempt.map(|a| a.time_spent_seconds))
    }

    async fn user_ids_active_since(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<String>> {
        let cutoff_bson = mongodb::bson::to_bson(&cutoff)?;
        let ids = self
            .collection
            .distinct("user_id", doc! { "completed_at": { "$gte": cutoff_bson } })
            .await?;

        Ok(ids
            .into_iter()
            .filter_map(|b| b.as_str().map(|s| s.to_string()))
            .collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_completed_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_index).await?;

        log::info!("Created indexes for quiz_attempts collection");
        Ok(())
    }
}
