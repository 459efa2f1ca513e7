pub mod jobs;
pub mod migrate;
pub mod records;
pub mod serve;
pub mod time_periods;

use std::sync::Arc;

use anyhow::Context;

use crate::database::postgres::PgStore;
use crate::database::store::Store;

/// Store for the data commands; these always need DATABASE_URL.
pub async fn connect_store() -> anyhow::Result<Arc<dyn Store>> {
    let store = PgStore::connect().await.context("Failed to connect to the database")?;
    Ok(Arc::new(store))
}
