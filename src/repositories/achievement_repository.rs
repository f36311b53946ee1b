use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Achievement, UserAchievement},
};

/// Read-only view of the achievement catalog.
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Full catalog in stable (id) order; evaluation walks this list.
    async fn find_all(&self) -> AppResult<Vec<Achievement>>;
}

pub struct MongoAchievementRepository {
    collection: Collection<Achievement>,
}

impl MongoAchievementRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("achievements");
        Self { collection }
    }
}

#[async_trait]
impl AchievementRepository for MongoAchievementRepository {
    async fn find_all(&self) -> AppResult<Vec<Achievement>> {
        let achievements = self
            .collection
            .find(doc! {})
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(achievements)
    }
}

/// Unlock records. `insert_if_absent` is the idempotency point: the unique
/// (user_id, achievement_id) index means racing evaluators agree on a single
/// winner and the loser sees `false`.
#[async_trait]
pub trait UserAchievementRepository: Send + Sync {
    /// Returns `Ok(true)` only for the insert that actually created the
    /// record.
    async fn insert_if_absent(&self, record: UserAchievement) -> AppResult<bool>;
    async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<UserAchievement>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserAchievementRepository {
    collection: Collection<UserAchievement>,
}

impl MongoUserAchievementRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("user_achievements");
        Self { collection }
    }
}

#[async_trait]
impl UserAchievementRepository for MongoUserAchievementRepository {
    async fn insert_if_absent(&self, record: UserAchievement) -> AppResult<bool> {
        let filter = doc! {
            "user_id": &record.user_id,
            "achievement_id": &record.achievement_id,
        };
        let update = doc! {
            "$setOnInsert": { "unlocked_at": to_bson(&record.unlocked_at)? },
        };

        let result = self
            .collection
            .update_one(filter, update)
            .upsert(true)
            .await?;

        Ok(result.upserted_id.is_some())
    }

    async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<UserAchievement>> {
        let records = self
            .collection
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await?;
        Ok(records)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_achievement_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "achievement_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;

        log::info!("Created indexes for user_achievements collection");
        Ok(())
    }
}
