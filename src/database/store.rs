use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::database::schema::RecordClass;
use crate::filter::FilterData;

/// A stored row keyed by column name, system columns included.
pub type Row = Map<String, Value>;

/// Persistence capabilities the record operations rely on.
///
/// Rows passed to `insert` and `update` carry declared attributes only; the
/// store owns `id`, `created_at` and `updated_at`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, class: &'static RecordClass, id: i64) -> Result<Option<Row>, DatabaseError>;

    /// Rows for whichever of `ids` exist, in no particular order.
    async fn find_many(&self, class: &'static RecordClass, ids: &[i64]) -> Result<Vec<Row>, DatabaseError>;

    async fn find_all(&self, class: &'static RecordClass, filter: &FilterData) -> Result<Vec<Row>, DatabaseError>;

    async fn insert(&self, class: &'static RecordClass, attributes: Row) -> Result<Row, DatabaseError>;

    async fn update(&self, class: &'static RecordClass, id: i64, attributes: Row) -> Result<Row, DatabaseError>;

    /// Returns false when no row had the id.
    async fn delete(&self, class: &'static RecordClass, id: i64) -> Result<bool, DatabaseError>;

    async fn exists(&self, class: &'static RecordClass, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.find(class, id).await?.is_some())
    }

    /// Short name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Fails when the backing storage cannot be reached.
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
