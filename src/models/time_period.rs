use std::sync::Arc;

use crate::database::record::Record;
use super::job::JOB;
use crate::database::schema::{AttributeDef, AttributeKind, DefaultValue, Dependent, RecordClass};
use crate::database::store::Store;
use crate::database::validation::Validation;
use crate::filter::FilterOrderInfo;
use crate::operations::outcome::Outcome;
use crate::operations::records::{AnyOperation, Factory, FindMatching, MatchOptions, OperationName};

/// A discrete search interval, starting with the given month and year.
pub static TIME_PERIOD: RecordClass = RecordClass {
    name: "TimePeriod",
    table: "time_periods",
    attributes: &[
        AttributeDef::new("month", AttributeKind::Integer, DefaultValue::Null),
        AttributeDef::new("year", AttributeKind::Integer, DefaultValue::Null),
    ],
    validations: &[
        Validation::Presence("month"),
        Validation::Integer { field: "month", min: Some(1), max: Some(12) },
        Validation::Uniqueness { field: "month", scope: &["year"] },
        Validation::Presence("year"),
        Validation::Integer { field: "year", min: Some(1), max: None },
    ],
    dependents: &[Dependent { class: &JOB, foreign_key: "time_period_id", name: "jobs" }],
    factory: Some(TimePeriod::factory),
};

pub struct TimePeriod;

impl TimePeriod {
    /// Newest period first.
    pub fn default_order() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo::desc("year"), FilterOrderInfo::desc("month")]
    }

    fn factory(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Factory {
        Factory::new(record_class, store).register(OperationName::FindMatching, |f| {
            AnyOperation::FindMatching(
                FindMatching::new(f.record_class(), f.store()).with_default_order(TimePeriod::default_order()),
            )
        })
    }

    /// The most recent period, if any exist.
    pub async fn active(store: Arc<dyn Store>) -> Outcome<Option<Record>> {
        Factory::for_class(&TIME_PERIOD, store)
            .find_matching()
            .call(MatchOptions::default().limit(1))
            .await
            .map(|records| records.into_iter().next())
    }

    /// `YYYY-MM` label, e.g. `2024-03`.
    pub fn label(record: &Record) -> Option<String> {
        Some(format!("{:04}-{:02}", record.get_i64("year")?, record.get_i64("month")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_active_is_latest_period() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        assert_eq!(TimePeriod::active(store.clone()).await.into_result(), Ok(None));

        let create = Factory::for_class(&TIME_PERIOD, store.clone()).create();
        for (month, year) in [(11, 2023), (2, 2024), (12, 2023)] {
            let _ = create.call(Some(&json!({ "month": month, "year": year }))).await;
        }

        let active = TimePeriod::active(store).await.into_result().unwrap().unwrap();
        assert_eq!(TimePeriod::label(&active).as_deref(), Some("2024-02"));
    }
}
