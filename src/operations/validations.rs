//! Parameter guards shared by the record operations.
//!
//! Each guard passes with `()` or fails with the error the operation
//! reports. Messages are part of the public contract.

use serde_json::Value;

use super::error::OperationError;
use super::outcome::Outcome;
use crate::database::record::Record;
use crate::database::schema::RecordClass;

const BLANK: &str = "can't be blank";
const NOT_AN_INTEGER: &str = "must be an Integer";

fn passed() -> Outcome<()> {
    Outcome::success(())
}

fn invalid(field: impl Into<String>, message: &str) -> Outcome<()> {
    Outcome::failure(OperationError::invalid_parameter(field, message))
}

pub fn require_non_null_id(id: &Value, field: &str) -> Outcome<()> {
    if id.is_null() {
        invalid(field, BLANK)
    } else {
        passed()
    }
}

/// Passes for null; pair with [`require_non_null_id`].
pub fn require_integer_id(id: &Value, field: &str) -> Outcome<()> {
    if id.is_null() || id.as_i64().is_some() {
        passed()
    } else {
        invalid(field, NOT_AN_INTEGER)
    }
}

/// Non-null integer id, returned unwrapped.
pub fn require_id(id: &Value, field: &str) -> Outcome<i64> {
    match id.as_i64() {
        Some(id) => Outcome::success(id),
        None if id.is_null() => Outcome::failure(OperationError::invalid_parameter(field, BLANK)),
        None => Outcome::failure(OperationError::invalid_parameter(field, NOT_AN_INTEGER)),
    }
}

/// Non-empty array whose every element is a non-null integer. Elements are
/// reported as `ids.<index>`.
pub fn require_id_array(ids: &Value) -> Outcome<Vec<i64>> {
    let items = match ids {
        Value::Null => return Outcome::failure(OperationError::invalid_parameter("ids", BLANK)),
        Value::Array(items) if items.is_empty() => {
            return Outcome::failure(OperationError::invalid_parameter("ids", BLANK));
        }
        Value::Array(items) => items,
        _ => return Outcome::failure(OperationError::invalid_parameter("ids", "must be an Array")),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match require_id(item, &format!("ids.{}", index)).into_result() {
            Ok(id) => out.push(id),
            Err(error) => return Outcome::failure(error),
        }
    }
    Outcome::success(out)
}

pub fn require_attributes_hash(attributes: &Value) -> Outcome<()> {
    if attributes.is_object() {
        passed()
    } else {
        invalid("attributes", "must be a Hash")
    }
}

pub fn require_valid_record(record: &Record, record_class: &'static RecordClass) -> Outcome<()> {
    if record.class() == record_class {
        passed()
    } else {
        Outcome::failure(OperationError::invalid_record(record_class.name))
    }
}
