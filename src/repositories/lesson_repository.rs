use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use crate::{db::Database, errors::AppResult, models::domain::Lesson};

/// Read-only view of the lesson catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>>;
    async fn list_ids_by_category(&self, category: &str) -> AppResult<Vec<String>>;
}

pub struct MongoLessonRepository {
    collection: Collection<Lesson>,
}

impl MongoLessonRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("lessons");
        Self { collection }
    }
}

#[async_trait]
impl LessonRepository for MongoLessonRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        let lesson = self.collection.find_one(doc! { "id": id }).await?;
        Ok(lesson)
    }

    async fn list_ids_by_category(&self, category: &str) -> AppResult<Vec<String>> {
        let lessons: Vec<Lesson> = self
            .collection
            .find(doc! { "category": category })
            .await?
            .try_collect()
            .await?;
        Ok(lessons.into_iter().map(|lesson| lesson.id).collect())
    }
}
