use async_trait::async_trait;
use mongodb::{bson::doc, Collection};

use crate::{db::Database, errors::AppResult, models::domain::LearningPath};

/// Read-only view of the learning path catalog.
#[async_trait]
pub trait LearningPathRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<LearningPath>>;
}

pub struct MongoLearningPathRepository {
    collection: Collection<LearningPath>,
}

impl MongoLearningPathRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("learning_paths");
        Self { collection }
    }
}

#[async_trait]
impl LearningPathRepository for MongoLearningPathRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<LearningPath>> {
        let path = self.collection.find_one(doc! { "id": id }).await?;
        Ok(path)
    }
}
