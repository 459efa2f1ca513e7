use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::schema::RecordClass;
use crate::database::store::{Row, Store};
use crate::filter::{FilterData, SortDirection};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

#[derive(Default)]
struct State {
    tables: HashMap<&'static str, Table>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn table(&mut self, class: &RecordClass) -> &mut Table {
        self.tables.entry(class.table).or_default()
    }

    /// Strictly increasing, so creation order is also timestamp order.
    fn next_timestamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// In-process store used by tests and the `--memory` server mode.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self, class: &'static RecordClass) -> usize {
        let state = self.state.read().await;
        state.tables.get(class.table).map(|t| t.rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, class: &'static RecordClass, id: i64) -> Result<Option<Row>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tables.get(class.table).and_then(|t| t.rows.get(&id)).cloned())
    }

    async fn find_many(&self, class: &'static RecordClass, ids: &[i64]) -> Result<Vec<Row>, DatabaseError> {
        let state = self.state.read().await;
        let Some(table) = state.tables.get(class.table) else {
            return Ok(vec![]);
        };
        Ok(table.rows.values().filter(|row| row_id(row).is_some_and(|id| ids.contains(&id))).cloned().collect())
    }

    async fn find_all(&self, class: &'static RecordClass, filter: &FilterData) -> Result<Vec<Row>, DatabaseError> {
        for column in filter.conditions.keys().chain(filter.order.iter().map(|o| &o.column)) {
            if !class.has_column(column) {
                return Err(DatabaseError::QueryError(format!(
                    "Unknown column '{}' for table '{}'",
                    column, class.table
                )));
            }
        }

        let state = self.state.read().await;
        let mut rows: Vec<Row> = state
            .tables
            .get(class.table)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|row| {
                        filter.conditions.iter().all(|(column, expected)| {
                            matches_condition(row.get(column).unwrap_or(&Value::Null), expected)
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            filter
                .order
                .iter()
                .map(|o| {
                    let ordering = compare_values(
                        a.get(&o.column).unwrap_or(&Value::Null),
                        b.get(&o.column).unwrap_or(&Value::Null),
                    );
                    match o.sort {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = filter.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }

        debug!("Memory query on {} matched {} rows", class.table, rows.len());
        Ok(rows)
    }

    async fn insert(&self, class: &'static RecordClass, attributes: Row) -> Result<Row, DatabaseError> {
        let mut state = self.state.write().await;
        let timestamp = state.next_timestamp();
        let table = state.table(class);

        table.next_id += 1;
        let id = table.next_id;

        let mut row = attributes;
        row.insert("id".to_string(), Value::from(id));
        row.insert("created_at".to_string(), Value::String(timestamp.clone()));
        row.insert("updated_at".to_string(), Value::String(timestamp));
        table.rows.insert(id, row.clone());

        debug!("Inserted {} row {}", class.table, id);
        Ok(row)
    }

    async fn update(&self, class: &'static RecordClass, id: i64, attributes: Row) -> Result<Row, DatabaseError> {
        let mut state = self.state.write().await;
        let timestamp = state.next_timestamp();
        let row = state
            .table(class)
            .rows
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("{} row {}", class.table, id)))?;

        for (key, value) in attributes {
            row.insert(key, value);
        }
        row.insert("updated_at".to_string(), Value::String(timestamp));

        debug!("Updated {} row {}", class.table, id);
        Ok(row.clone())
    }

    async fn delete(&self, class: &'static RecordClass, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let removed = state.table(class).rows.remove(&id).is_some();
        debug!("Deleted {} row {}: {}", class.table, id, removed);
        Ok(removed)
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

fn matches_condition(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::Array(candidates) => candidates.iter().any(|c| values_equal(actual, c)),
        other => values_equal(actual, other),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over JSON scalars; null sorts after everything else.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
