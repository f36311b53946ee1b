use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

/// Handle to the application database. Repositories borrow typed collections
/// from it; nothing else talks to the driver directly.
#[derive(Clone)]
pub struct Database {
    handle: mongodb::Database,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(Duration::from_secs(5));
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(options)?;
        let handle = client.database(&config.mongo_db_name);

        // Fail at startup on a bad deployment, not at the first query.
        handle.run_command(doc! { "ping": 1 }).await?;
        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);

        Ok(Self { handle })
    }

    pub fn get_collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.handle.collection(name)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.handle.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
