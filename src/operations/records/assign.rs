use async_trait::async_trait;
use serde_json::Value;

use super::stages::AssignStage;
use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps_sync};
use crate::operations::validations::{require_attributes_hash, require_valid_record};

/// Merges attributes onto an existing record without saving it.
#[derive(Debug, Clone, Copy)]
pub struct Assign {
    record_class: &'static RecordClass,
}

impl Assign {
    pub fn new(record_class: &'static RecordClass) -> Self {
        Self { record_class }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Assign", self.record_class)
    }

    /// On failure the record comes back untouched.
    pub fn call(&self, record: Record, attributes: &Value) -> Outcome<Record> {
        let outcome = self.process(record, attributes);
        log_outcome(&self.name(), &outcome);
        outcome
    }

    fn process(&self, mut record: Record, attributes: &Value) -> Outcome<Record> {
        let checked = steps_sync(|| {
            step(require_attributes_hash(attributes))?;
            step(require_valid_record(&record, self.record_class))
        });

        if let Err(error) = checked.into_result() {
            return Outcome::failure_with_value(error, record);
        }

        let assigned = match attributes.as_object() {
            Some(map) => record.assign_attributes(map).map(|_| ()),
            None => Ok(()),
        };

        match assigned {
            Ok(()) => Outcome::success(record),
            Err(error) => Outcome::failure_with_value(error.into(), record),
        }
    }
}

#[async_trait]
impl AssignStage for Assign {
    async fn assign(&self, record: Record, attributes: &Value) -> Outcome<Record> {
        self.call(record, attributes)
    }
}
