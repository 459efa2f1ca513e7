use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::filter::FilterData;
use crate::operations::error::FieldError;

/// Declarative validation rule attached to a [`RecordClass`].
#[derive(Debug)]
pub enum Validation {
    /// Value must not be null or a blank string.
    Presence(&'static str),
    /// Value must be one of `values`.
    Inclusion {
        field: &'static str,
        values: &'static [&'static str],
        allow_blank: bool,
    },
    /// Value must be an integer within the optional bounds. Null is skipped;
    /// pair with `Presence` to require it.
    Integer {
        field: &'static str,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// No other stored record may share the value within `scope`.
    Uniqueness {
        field: &'static str,
        scope: &'static [&'static str],
    },
    /// `field` must hold the id of a stored `class` record; reported on `label`.
    Reference {
        field: &'static str,
        label: &'static str,
        class: &'static RecordClass,
    },
}

const BLANK: &str = "can't be blank";

/// Runs every validation of the record's class, in declaration order.
pub async fn validate(record: &Record, store: &dyn Store) -> Result<Vec<FieldError>, DatabaseError> {
    let mut errors = Vec::new();

    for validation in record.class().validations {
        if let Some(error) = validation.check(record, store).await? {
            errors.push(error);
        }
    }

    Ok(errors)
}

/// One `base` error per dependent class that still references the record.
pub async fn check_dependents(record: &Record, store: &dyn Store) -> Result<Vec<FieldError>, DatabaseError> {
    let Some(id) = record.id() else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::new();
    for dependent in record.class().dependents {
        let filter = FilterData::default().condition(dependent.foreign_key, id).limit(1);
        if !store.find_all(dependent.class, &filter).await?.is_empty() {
            errors.push(error(
                "base",
                format!("Cannot delete record because dependent {} exist", dependent.name),
            ));
        }
    }

    Ok(errors)
}

impl Validation {
    async fn check(&self, record: &Record, store: &dyn Store) -> Result<Option<FieldError>, DatabaseError> {
        let error = match self {
            Validation::Presence(field) => {
                is_blank(record.get(field)).then(|| error(field, BLANK))
            }
            Validation::Inclusion { field, values, allow_blank } => {
                let value = record.get(field);
                if *allow_blank && is_blank(value) {
                    None
                } else {
                    let included = value
                        .and_then(Value::as_str)
                        .map(|s| values.contains(&s))
                        .unwrap_or(false);
                    (!included).then(|| error(field, "is not included in the list"))
                }
            }
            Validation::Integer { field, min, max } => {
                check_integer(field, record.get(field), *min, *max)
            }
            Validation::Uniqueness { field, scope } => {
                check_uniqueness(record, store, field, scope).await?
            }
            Validation::Reference { field, label, class } => match record.get_i64(field) {
                Some(id) if store.exists(class, id).await? => None,
                _ => Some(error(label, "must exist")),
            },
        };

        Ok(error)
    }
}

fn error(field: &str, message: impl Into<String>) -> FieldError {
    (field.to_string(), message.into())
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_integer(field: &str, value: Option<&Value>, min: Option<i64>, max: Option<i64>) -> Option<FieldError> {
    let number = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n,
        Some(Value::String(s)) => {
            return match s.trim().parse::<f64>() {
                Ok(_) => Some(error(field, "must be an integer")),
                Err(_) => Some(error(field, "is not a number")),
            };
        }
        Some(_) => return Some(error(field, "is not a number")),
    };

    let Some(n) = number.as_i64() else {
        return Some(error(field, "must be an integer"));
    };

    if let Some(min) = min.filter(|min| n < *min) {
        return Some(error(field, format!("must be greater than or equal to {}", min)));
    }
    if let Some(max) = max.filter(|max| n > *max) {
        return Some(error(field, format!("must be less than or equal to {}", max)));
    }
    None
}

async fn check_uniqueness(
    record: &Record,
    store: &dyn Store,
    field: &str,
    scope: &[&str],
) -> Result<Option<FieldError>, DatabaseError> {
    let value = match record.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value.clone(),
    };

    let mut conditions = Map::new();
    conditions.insert(field.to_string(), value);
    for column in scope {
        conditions.insert(column.to_string(), record.get(column).cloned().unwrap_or(Value::Null));
    }

    let filter = FilterData { conditions, ..Default::default() };
    let taken = store
        .find_all(record.class(), &filter)
        .await?
        .iter()
        .any(|row| row.get("id").and_then(Value::as_i64) != record.id());

    Ok(taken.then(|| error(field, "has already been taken")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::{JOB, TIME_PERIOD};
    use serde_json::json;

    fn time_period(month: Value, year: Value) -> Record {
        let mut record = Record::new(&TIME_PERIOD);
        record.set("month", month).unwrap();
        record.set("year", year).unwrap();
        record
    }

    #[test]
    fn test_integer_messages() {
        assert_eq!(check_integer("month", Some(&json!("abc")), None, None).unwrap().1, "is not a number");
        assert_eq!(check_integer("month", Some(&json!(1.5)), None, None).unwrap().1, "must be an integer");
        assert_eq!(
            check_integer("month", Some(&json!(13)), Some(1), Some(12)).unwrap().1,
            "must be less than or equal to 12"
        );
        assert_eq!(
            check_integer("month", Some(&json!(0)), Some(1), Some(12)).unwrap().1,
            "must be greater than or equal to 1"
        );
        assert!(check_integer("month", Some(&Value::Null), Some(1), None).is_none());
    }

    #[tokio::test]
    async fn test_time_period_validations() {
        let store = MemoryStore::new();

        let errors = validate(&time_period(Value::Null, json!(0)), &store).await.unwrap();
        assert_eq!(
            errors,
            vec![
                ("month".to_string(), "can't be blank".to_string()),
                ("year".to_string(), "must be greater than or equal to 1".to_string()),
            ]
        );

        let errors = validate(&time_period(json!(4), json!(2024)), &store).await.unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_uniqueness_is_scoped() {
        let store = MemoryStore::new();
        let row = time_period(json!(4), json!(2024)).to_row();
        store.insert(&TIME_PERIOD, row).await.unwrap();

        let errors = validate(&time_period(json!(4), json!(2024)), &store).await.unwrap();
        assert_eq!(errors, vec![("month".to_string(), "has already been taken".to_string())]);

        let errors = validate(&time_period(json!(4), json!(2025)), &store).await.unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_job_reference_and_inclusion() {
        let store = MemoryStore::new();
        let mut job = Record::new(&JOB);
        job.set("company_name", "Acme").unwrap();
        job.set("source", "Web").unwrap();
        job.set("application_status", "hired").unwrap();
        job.set("job_type", "").unwrap();

        let errors = validate(&job, &store).await.unwrap();
        assert_eq!(
            errors,
            vec![
                ("application_status".to_string(), "is not included in the list".to_string()),
                ("time_period".to_string(), "must exist".to_string()),
            ]
        );
    }
}
