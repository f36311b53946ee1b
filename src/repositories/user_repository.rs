use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::User,
};

/// Storage port for the per-user progression aggregate.
///
/// `update_if_version` is the conditional write the whole concurrency story
/// hangs off: it only persists when the stored `version` still equals
/// `expected_version`, so two racing writers cannot both win.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_all(&self) -> AppResult<Vec<User>>;
    /// Returns `Ok(false)` when the conditional write lost the race.
    async fn update_if_version(&self, user: &User, expected_version: u64) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn update_if_version(&self, user: &User, expected_version: u64) -> AppResult<bool> {
        let filter = doc! {
            "id": &user.id,
            "version": expected_version as i64,
        };

        let result = self.collection.replace_one(filter, user).await?;

        if result.matched_count == 0 {
            // Either the user is gone or another writer bumped the version.
            let exists = self
                .collection
                .find_one(doc! { "id": &user.id })
                .await?
                .is_some();
            if !exists {
                return Err(AppError::NotFound(format!(
                    "User with id '{}' not found",
                    user.id
                )));
            }
            return Ok(false);
        }

        Ok(true)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("id_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;

        let xp_index = IndexModel::builder()
            .keys(doc! { "total_xp": -1 })
            .options(IndexOptions::builder().name("total_xp".to_string()).build())
            .build();
        self.collection.create_index(xp_index).await?;

        log::info!("Created indexes for users collection");
        Ok(())
    }
}
