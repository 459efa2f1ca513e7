use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{load_record, log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps};
use crate::operations::validations::require_id_array;

/// Records found by [`FindMany`], in the order their ids were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundRecords {
    pub records: Vec<Record>,
    /// Requested ids with no stored record. Only ever non-empty when partial
    /// results were allowed.
    pub missing: Vec<i64>,
}

/// Looks up several records by primary key.
#[derive(Clone)]
pub struct FindMany {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
}

impl FindMany {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self { record_class, store }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("FindMany", self.record_class)
    }

    /// Fails with NotFound listing the missing ids unless `allow_partial`.
    pub async fn call(&self, ids: &Value, allow_partial: bool) -> Outcome<FoundRecords> {
        let outcome = steps(async {
            let ids = step(require_id_array(ids))?;

            let rows = self
                .store
                .find_many(self.record_class, &ids)
                .await
                .map_err(OperationError::from)?;

            let mut records = rows
                .into_iter()
                .map(|row| load_record(self.record_class, row))
                .collect::<Result<Vec<_>, _>>()?;
            records.sort_by_key(|record| ids.iter().position(|id| Some(*id) == record.id()));

            let missing: Vec<i64> = ids
                .iter()
                .copied()
                .filter(|id| !records.iter().any(|record| record.id() == Some(*id)))
                .collect();

            if !allow_partial && !missing.is_empty() {
                let mut attributes = Map::new();
                attributes.insert("ids".to_string(), Value::from(missing));
                return Err(OperationError::not_found(self.record_class.name, attributes).into());
            }

            Ok(FoundRecords { records, missing })
        })
        .await;

        log_outcome(&self.name(), &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::TIME_PERIOD;
    use crate::operations::records::Create;
    use serde_json::json;

    async fn seeded() -> Arc<dyn Store> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let create = Create::new(&TIME_PERIOD, store.clone());
        for month in 1..=3 {
            let _ = create.call(Some(&json!({ "month": month, "year": 2024 }))).await;
        }
        store
    }

    #[tokio::test]
    async fn test_finds_in_requested_order() {
        let find = FindMany::new(&TIME_PERIOD, seeded().await);
        let found = find.call(&json!([3, 1]), false).await.into_result().unwrap();

        let ids: Vec<_> = found.records.iter().map(Record::id).collect();
        assert_eq!(ids, vec![Some(3), Some(1)]);
        assert!(found.missing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_ids_fail_by_default() {
        let find = FindMany::new(&TIME_PERIOD, seeded().await);
        let outcome = find.call(&json!([1, 8, 9]), false).await;

        assert_eq!(
            outcome.error().map(|e| e.message()).as_deref(),
            Some("TimePeriod not found with attributes ids: [8, 9]")
        );
    }

    #[tokio::test]
    async fn test_partial_results_report_missing_ids() {
        let find = FindMany::new(&TIME_PERIOD, seeded().await);
        let found = find.call(&json!([2, 9]), true).await.into_result().unwrap();

        assert_eq!(found.records.len(), 1);
        assert_eq!(found.missing, vec![9]);
    }

    #[tokio::test]
    async fn test_invalid_ids() {
        let find = FindMany::new(&TIME_PERIOD, seeded().await);

        let empty = find.call(&json!([]), true).await;
        assert_eq!(empty.error().unwrap().message(), "Invalid request parameters: ids can't be blank");

        let mixed = find.call(&json!([1, "2"]), true).await;
        assert_eq!(mixed.error().unwrap().message(), "Invalid request parameters: ids 1 must be an Integer");
    }
}
