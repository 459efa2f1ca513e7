use std::sync::Arc;

use serde_json::{Map, Value};

use super::{load_record, log_outcome, operation_name};
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::filter::{FilterData, FilterOrderInfo};
use crate::operations::error::OperationError;
use crate::operations::outcome::Outcome;
use crate::operations::steps::steps;

/// Query criteria for [`FindMatching`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOptions {
    /// Empty means the operation's default order.
    pub order: Vec<FilterOrderInfo>,
    pub conditions: Map<String, Value>,
    pub limit: Option<i64>,
}

impl MatchOptions {
    pub fn ordered(order: Vec<FilterOrderInfo>) -> Self {
        Self { order, ..Default::default() }
    }

    pub fn condition(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Lists the records matching equality conditions, sorted.
#[derive(Clone)]
pub struct FindMatching {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
    default_order: Vec<FilterOrderInfo>,
}

impl FindMatching {
    /// Defaults to newest first.
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        Self {
            record_class,
            store,
            default_order: vec![FilterOrderInfo::desc("created_at")],
        }
    }

    pub fn with_default_order(mut self, order: Vec<FilterOrderInfo>) -> Self {
        self.default_order = order;
        self
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn default_order(&self) -> &[FilterOrderInfo] {
        &self.default_order
    }

    pub fn name(&self) -> String {
        operation_name("FindMatching", self.record_class)
    }

    /// An empty result is still a success.
    pub async fn call(&self, options: MatchOptions) -> Outcome<Vec<Record>> {
        let outcome = steps(async {
            self.check_columns(&options)?;

            let order = if options.order.is_empty() {
                self.default_order.clone()
            } else {
                options.order
            };
            let filter = FilterData { conditions: options.conditions, order, limit: options.limit };

            let rows = self
                .store
                .find_all(self.record_class, &filter)
                .await
                .map_err(OperationError::from)?;

            Ok(rows
                .into_iter()
                .map(|row| load_record(self.record_class, row))
                .collect::<Result<Vec<_>, _>>()?)
        })
        .await;

        log_outcome(&self.name(), &outcome);
        outcome
    }

    fn check_columns(&self, options: &MatchOptions) -> Result<(), OperationError> {
        if options.order.iter().any(|o| !self.record_class.has_column(&o.column)) {
            return Err(OperationError::invalid_parameter("order", "is invalid"));
        }

        let unknown: Vec<String> = options
            .conditions
            .keys()
            .filter(|column| !self.record_class.has_column(column))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(OperationError::unknown_attributes(self.record_class.name, unknown));
        }

        Ok(())
    }
}
