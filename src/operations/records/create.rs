use std::sync::Arc;

use serde_json::Value;

use super::build::Build;
use super::save::Save;
use super::stages::{BuildStage, SaveStage};
use super::{log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::operations::outcome::Outcome;
use crate::operations::steps::{step, steps};

/// Builds a record from attributes, then saves it.
#[derive(Clone)]
pub struct Create {
    record_class: &'static RecordClass,
    build: Arc<dyn BuildStage>,
    save: Arc<dyn SaveStage>,
}

impl Create {
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self::with_stages(
            record_class,
            Arc::new(Build::new(record_class)),
            Arc::new(Save::new(record_class, store)),
        )
    }

    /// Substitute either stage, e.g. to pre-fill attributes on build.
    pub fn with_stages(
        record_class: &'static RecordClass,
        build: Arc<dyn BuildStage>,
        save: Arc<dyn SaveStage>,
    ) -> Self {
        Self { record_class, build, save }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn name(&self) -> String {
        operation_name("Create", self.record_class)
    }

    pub async fn call(&self, attributes: Option<&Value>) -> Outcome<Record> {
        let outcome = steps(async {
            let record = step(self.build.build(attributes).await)?;

            step(self.save.save(record).await)
        })
        .await;

        log_outcome(&self.name(), &outcome);
        outcome
    }
}
