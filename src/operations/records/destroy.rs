use std::sync::Arc;

use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::database::validation::check_dependents;
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::validations::require_valid_record;

/// Removes a record from the store.
#[derive(Clone)]
pub struct Destroy {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
}

impl Destroy {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self { record_class, store }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Destroy", self.record_class)
    }

    /// Returns the record, no longer persisted. Records other rows still
    /// reference fail validation and stay in the store.
    pub async fn call(&self, record: Record) -> Outcome<Record> {
        let outcome = self.process(record).await;
        log_outcome(&self.name(), &outcome);
        outcome
    }

    async fn process(&self, mut record: Record) -> Outcome<Record> {
        if let Err(error) = require_valid_record(&record, self.record_class).into_result() {
            return Outcome::failure_with_value(error, record);
        }

        if let Some(id) = record.id().filter(|_| record.is_persisted()) {
            match check_dependents(&record, self.store.as_ref()).await {
                Ok(errors) if errors.is_empty() => {}
                Ok(errors) => {
                    let error = OperationError::failed_validation(self.record_class.name, errors);
                    return Outcome::failure_with_value(error, record);
                }
                Err(error) => return Outcome::failure_with_value(error.into(), record),
            }

            if let Err(error) = self.store.delete(self.record_class, id).await {
                return Outcome::failure_with_value(error.into(), record);
            }
        }

        record.mark_destroyed();
        Outcome::success(record)
    }
}
