use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::PathEnrollment};

/// Per-path progress records. Set-adds are single-document atomic updates
/// with upsert, so no version token is needed: concurrent adds of the same
/// id collapse into one membership and exactly one caller observes `true`.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find(&self, user_id: &str, path_id: &str) -> AppResult<Option<PathEnrollment>>;
    /// Returns `Ok(true)` when the lesson id was not yet in the completed
    /// set. Creates the enrollment on first touch.
    async fn add_completed_lesson(
        &self,
        user_id: &str,
        path_id: &str,
        lesson_id: &str,
    ) -> AppResult<bool>;
    async fn add_completed_quiz(
        &self,
        user_id: &str,
        path_id: &str,
        quiz_id: &str,
    ) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoEnrollmentRepository {
    collection: Collection<PathEnrollment>,
}

impl MongoEnrollmentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("path_enrollments");
        Self { collection }
    }

    async fn add_completed_item(
        &self,
        user_id: &str,
        path_id: &str,
        field: &str,
        item_id: &str,
    ) -> AppResult<bool> {
        let now = to_bson(&Utc::now())?;
        let filter = doc! { "user_id": user_id, "path_id": path_id };
        let update = doc! {
            "$addToSet": { field: item_id },
            "$set": { "last_activity_at": &now },
            "$setOnInsert": { "started_at": &now },
        };

        // Default find_one_and_update returns the pre-image; None means the
        // upsert created the enrollment, so the item is necessarily new.
        let before = self
            .collection
            .find_one_and_update(filter, update)
            .upsert(true)
            .await?;

        let newly_added = match before {
            None => true,
            Some(enrollment) => {
                let set = if field == "completed_lesson_ids" {
                    &enrollment.completed_lesson_ids
                } else {
                    &enrollment.completed_quiz_ids
                };
                !set.iter().any(|id| id == item_id)
            }
        };

        Ok(newly_added)
    }
}

#[async_trait]
impl EnrollmentRepository for MongoEnrollmentRepository {
    async fn find(&self, user_id: &str, path_id: &str) -> AppResult<Option<PathEnrollment>> {
        let enrollment = self
            .collection
            .find_one(doc! { "user_id": user_id, "path_id": path_id })
            .await?;
        Ok(enrollment)
    }

    async fn add_completed_lesson(
        &self,
        user_id: &str,
        path_id: &str,
        lesson_id: &str,
    ) -> AppResult<bool> {
        self.add_completed_item(user_id, path_id, "completed_lesson_ids", lesson_id)
            .await
    }

    async fn add_completed_quiz(
        &self,
        user_id: &str,
        path_id: &str,
        quiz_id: &str,
    ) -> AppResult<bool> {
        self.add_completed_item(user_id, path_id, "completed_quiz_ids", quiz_id)
            .await
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_path_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "path_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;

        log::info!("Created indexes for path_enrollments collection");
        Ok(())
    }
}
