use std::sync::Arc;

use serde_json::{Map, Value};

use super::{load_record, log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps};
use crate::operations::validations::require_id;

/// Looks up one record by primary key.
#[derive(Clone)]
pub struct FindOne {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
}

impl FindOne {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self { record_class, store }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("FindOne", self.record_class)
    }

    pub async fn call(&self, id: &Value) -> Outcome<Record> {
        self.call_as(id, "id").await
    }

    /// Reports a miss under `label`, e.g. `time_period_id` when resolving a
    /// foreign key.
    pub async fn call_as(&self, id: &Value, label: &str) -> Outcome<Record> {
        let outcome = steps(async {
            let key = step(require_id(id, "id"))?;

            match self.store.find(self.record_class, key).await.map_err(OperationError::from)? {
                Some(row) => Ok(load_record(self.record_class, row)?),
                None => {
                    let mut attributes = Map::new();
                    attributes.insert(label.to_string(), id.clone());
                    Err(OperationError::not_found(self.record_class.name, attributes).into())
                }
            }
        })
        .await;

        log_outcome(&self.name(), &outcome);
        outcome
    }
}
