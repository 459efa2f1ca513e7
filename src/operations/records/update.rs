use std::sync::Arc;

use serde_json::Value;

use super::assign::Assign;
use super::save::Save;
use super::stages::{AssignStage, SaveStage};
use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps};

/// Assigns attributes to a record, then saves it.
#[derive(Clone)]
pub struct Update {
    record_class: &'static RecordClass,
    assign: Arc<dyn AssignStage>,
    save: Arc<dyn SaveStage>,
}

impl Update {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self::with_stages(
            record_class,
            Arc::new(Assign::new(record_class)),
            Arc::new(Save::new(record_class, store)),
        )
    }

    pub fn with_stages(
        record_class: &'static RecordClass,
        assign: Arc<dyn AssignStage>,
        save: Arc<dyn SaveStage>,
    ) -> Self {
        Self { record_class, assign, save }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Update", self.record_class)
    }

    pub async fn call(&self, record: Record, attributes: &Value) -> Outcome<Record> {
        let outcome = steps(async {
            let record = step(self.assign.assign(record, attributes).await)?;

            step(self.save.save(record).await)
        })
        .await;

        log_outcome(&self.name(), &outcome);
        outcome
    }
}
