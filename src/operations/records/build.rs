use async_trait::async_trait;
use serde_json::Value;

use super::stages::BuildStage;
use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps_sync};
use crate::operations::validations::require_attributes_hash;

/// Initializes a new, unsaved record from the given attributes.
#[derive(Debug, Clone, Copy)]
pub struct Build {
    record_class: &'static RecordClass,
}

impl Build {
    pub fn new(record_class: &'static RecordClass) -> Self {
        Self { record_class }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Build", self.record_class)
    }

    /// `None` builds a record with every attribute at its default.
    pub fn call(&self, attributes: Option<&Value>) -> Outcome<Record> {
        let outcome = steps_sync(|| {
            let mut record = Record::new(self.record_class);

            if let Some(attributes) = attributes {
                step(require_attributes_hash(attributes))?;

                if let Some(map) = attributes.as_object() {
                    record.assign_attributes(map).map_err(OperationError::from)?;
                }
            }

            Ok(record)
        });

        log_outcome(&self.name(), &outcome);
        outcome
    }
}

#[async_trait]
impl BuildStage for Build {
    async fn build(&self, attributes: Option<&Value>) -> Outcome<Record> {
        self.call(attributes)
    }
}
