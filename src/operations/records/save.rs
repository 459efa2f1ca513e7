use std::sync::Arc;

use async_trait::async_trait;

use super::stages::SaveStage;
use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::database::validation::validate;
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::validations::require_valid_record;

/// Validates a record and persists it: inserts new records, updates stored
/// ones. Unchanged stored records are not written.
#[derive(Clone)]
pub struct Save {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
}

impl Save {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self { record_class, store }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Save", self.record_class)
    }

    /// Every failure hands the unsaved record back.
    pub async fn call(&self, record: Record) -> Outcome<Record> {
        let outcome = self.process(record).await;
        log_outcome(&self.name(), &outcome);
        outcome
    }

    async fn process(&self, mut record: Record) -> Outcome<Record> {
        if let Err(error) = require_valid_record(&record, self.record_class).into_result() {
            return Outcome::failure_with_value(error, record);
        }

        if record.is_destroyed() {
            let error = OperationError::other(format!("Cannot save a destroyed {}", self.record_class.name));
            return Outcome::failure_with_value(error, record);
        }

        let errors = match validate(&record, self.store.as_ref()).await {
            Ok(errors) => errors,
            Err(error) => return Outcome::failure_with_value(error.into(), record),
        };

        if !errors.is_empty() {
            let error = OperationError::failed_validation(self.record_class.name, errors);
            return Outcome::failure_with_value(error, record);
        }

        let written = match record.id() {
            Some(_) if !record.has_changes() => return Outcome::success(record),
            Some(id) => self.store.update(self.record_class, id, record.to_row()).await,
            None => self.store.insert(self.record_class, record.to_row()).await,
        };

        let loaded = written
            .map_err(OperationError::from)
            .and_then(|row| record.load_row(row).map(|_| ()).map_err(OperationError::from));

        match loaded {
            Ok(()) => Outcome::success(record),
            Err(error) => Outcome::failure_with_value(error, record),
        }
    }
}

#[async_trait]
impl SaveStage for Save {
    async fn save(&self, record: Record) -> Outcome<Record> {
        self.call(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::{JOB, TIME_PERIOD};
    use serde_json::json;

    fn time_period(month: i64, year: i64) -> Record {
        let mut record = Record::new(&TIME_PERIOD);
        record.set("month", month).unwrap();
        record.set("year", year).unwrap();
        record
    }

    #[tokio::test]
    async fn test_inserts_new_record() {
        let store = Arc::new(MemoryStore::new());
        let save = Save::new(&TIME_PERIOD, store.clone());

        let record = save.call(time_period(5, 2024)).await.into_result().unwrap();

        assert!(record.is_persisted());
        assert!(record.id().unwrap() > 0);
        assert!(record.created_at().is_some());
        assert!(!record.has_changes());
        assert_eq!(store.count(&TIME_PERIOD).await, 1);
    }

    #[tokio::test]
    async fn test_updates_stored_record() {
        let store = Arc::new(MemoryStore::new());
        let save = Save::new(&TIME_PERIOD, store.clone());
        let mut record = save.call(time_period(5, 2024)).await.into_result().unwrap();

        record.set("month", 6).unwrap();
        let record = save.call(record).await.into_result().unwrap();

        assert_eq!(record.get("month"), Some(&json!(6)));
        assert_eq!(store.count(&TIME_PERIOD).await, 1);
    }

    #[tokio::test]
    async fn test_failed_validation_returns_unsaved_record() {
        let store = Arc::new(MemoryStore::new());
        let outcome = Save::new(&TIME_PERIOD, store.clone()).call(time_period(13, 2024)).await;

        assert_eq!(
            outcome.error(),
            Some(&OperationError::failed_validation(
                "TimePeriod",
                vec![("month".to_string(), "must be less than or equal to 12".to_string())]
            ))
        );
        assert!(outcome.value().is_some_and(|r| r.is_new_record()));
        assert_eq!(store.count(&TIME_PERIOD).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_record_of_another_class() {
        let store = Arc::new(MemoryStore::new());
        let outcome = Save::new(&JOB, store).call(time_period(1, 2024)).await;

        assert_eq!(outcome.error(), Some(&OperationError::invalid_record("Job")));
        assert!(outcome.value().is_some());
    }
}
