use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::LessonCompletion};

/// Global (path-independent) lesson completion log, one record per
/// (user, lesson). The insert result is what gates the lesson XP award.
#[async_trait]
pub trait LessonProgressRepository: Send + Sync {
    /// Returns `Ok(true)` only when this call created the record.
    async fn insert_completion(&self, record: LessonCompletion) -> AppResult<bool>;
    async fn completed_lesson_ids(&self, user_id: &str) -> AppResult<Vec<String>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoLessonProgressRepository {
    collection: Collection<LessonCompletion>,
}

impl MongoLessonProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("lesson_completions");
        Self { collection }
    }
}

#[async_trait]
impl LessonProgressRepository for MongoLessonProgressRepository {
    async fn insert_completion(&self, record: LessonCompletion) -> AppResult<bool> {
        let filter = doc! {
            "user_id": &record.user_id,
            "lesson_id": &record.lesson_id,
        };
        let update = doc! {
            "$setOnInsert": { "completed_at": to_bson(&record.completed_at)? },
        };

        let result = self
            .collection
            .update_one(filter, update)
            .upsert(true)
            .await?;

        Ok(result.upserted_id.is_some())
    }

    async fn completed_lesson_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let records: Vec<LessonCompletion> = self
            .collection
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await?;
        Ok(records.into_iter().map(|r| r.lesson_id).collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_lesson_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "lesson_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;

        log::info!("Created indexes for lesson_completions collection");
        Ok(())
    }
}
