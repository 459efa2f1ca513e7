use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::record::RecordError;

/// A `(field, message)` pair, serialized as a two-element array.
pub type FieldError = (String, String);

const INVALID_PARAMETERS_MESSAGE: &str = "Invalid request parameters";

/// Errors returned as data by record operations.
///
/// Every variant serializes to `{ "type", "message", "data" }`. Both the
/// `type` tag and the message wording are consumed by callers, so they must
/// stay stable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("{}", invalid_parameters_message(.errors))]
    InvalidParameters { errors: Vec<FieldError> },

    #[error("Record should be a {record_class}")]
    InvalidRecord { record_class: &'static str },

    #[error("{}", not_found_message(.record_class, .attributes))]
    NotFound {
        attributes: Map<String, Value>,
        record_class: &'static str,
    },

    #[error("{}", unknown_attributes_message(.record_class, .attributes))]
    UnknownAttributes {
        attributes: Vec<String>,
        record_class: &'static str,
    },

    #[error("{}", failed_validation_message(.record_class, .errors))]
    FailedValidation {
        errors: Vec<FieldError>,
        record_class: &'static str,
    },

    /// Anything outside the taxonomy, e.g. a storage fault.
    #[error("{message}")]
    Other { message: String },
}

impl OperationError {
    pub fn invalid_parameters(errors: Vec<FieldError>) -> Self {
        OperationError::InvalidParameters { errors }
    }

    /// Shorthand for a single `(field, message)` parameter error.
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        OperationError::InvalidParameters { errors: vec![(field.into(), message.into())] }
    }

    pub fn invalid_record(record_class: &'static str) -> Self {
        OperationError::InvalidRecord { record_class }
    }

    pub fn not_found(record_class: &'static str, attributes: Map<String, Value>) -> Self {
        OperationError::NotFound { attributes, record_class }
    }

    pub fn unknown_attributes(record_class: &'static str, attributes: Vec<String>) -> Self {
        OperationError::UnknownAttributes { attributes, record_class }
    }

    pub fn failed_validation(record_class: &'static str, errors: Vec<FieldError>) -> Self {
        OperationError::FailedValidation { errors, record_class }
    }

    pub fn other(message: impl Into<String>) -> Self {
        OperationError::Other { message: message.into() }
    }

    /// Short string used to identify the type of error.
    pub fn type_tag(&self) -> &'static str {
        match self {
            OperationError::InvalidParameters { .. } => "invalid_parameters",
            OperationError::InvalidRecord { .. } => "invalid_record",
            OperationError::NotFound { .. } => "not_found",
            OperationError::UnknownAttributes { .. } => "unknown_attributes",
            OperationError::FailedValidation { .. } => "failed_validation",
            OperationError::Other { .. } => "error",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Variant-specific structured data.
    pub fn data(&self) -> Value {
        match self {
            OperationError::InvalidParameters { errors } => json!({ "errors": errors }),
            OperationError::InvalidRecord { record_class } => {
                json!({ "record_class": record_class })
            }
            OperationError::NotFound { attributes, record_class } => json!({
                "attributes": attributes,
                "record_class": record_class,
            }),
            OperationError::UnknownAttributes { attributes, record_class } => json!({
                "attributes": attributes,
                "record_class": record_class,
            }),
            OperationError::FailedValidation { errors, record_class } => json!({
                "errors": errors,
                "record_class": record_class,
            }),
            OperationError::Other { .. } => json!({}),
        }
    }

    /// Serializable `{ type, message, data }` representation.
    pub fn as_json(&self) -> Value {
        json!({
            "data": self.data(),
            "message": self.message(),
            "type": self.type_tag(),
        })
    }
}

impl Serialize for OperationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl From<DatabaseError> for OperationError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!("Storage error during record operation: {}", err);
        OperationError::other(err.to_string())
    }
}

impl From<RecordError> for OperationError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::UnknownAttributes { class, attributes } => {
                OperationError::unknown_attributes(class, attributes)
            }
            other => {
                tracing::error!("Unreadable stored row: {}", other);
                OperationError::other(other.to_string())
            }
        }
    }
}

fn invalid_parameters_message(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return INVALID_PARAMETERS_MESSAGE.to_string();
    }

    let formatted: Vec<String> = errors
        .iter()
        .map(|(key, message)| format!("{} {}", key.replace('.', " "), message))
        .collect();

    format!("{}: {}", INVALID_PARAMETERS_MESSAGE, formatted.join(", "))
}

fn not_found_message(record_class: &str, attributes: &Map<String, Value>) -> String {
    let message = format!("{} not found", record_class);

    if attributes.is_empty() {
        return message;
    }

    let formatted: Vec<String> = attributes
        .iter()
        .map(|(key, value)| format!("{}: {}", key, inspect(value)))
        .collect();

    format!("{} with attributes {}", message, formatted.join(", "))
}

fn unknown_attributes_message(record_class: &str, attributes: &[String]) -> String {
    let message = format!("Unknown attributes for {}", record_class);

    if attributes.is_empty() {
        return message;
    }

    format!("{}: {}", message, attributes.join(", "))
}

fn failed_validation_message(record_class: &str, errors: &[FieldError]) -> String {
    let message = format!("{} has validation errors", record_class);

    if errors.is_empty() {
        return message;
    }

    let formatted: Vec<String> =
        errors.iter().map(|(key, message)| format!("{} {}", key, message)).collect();

    format!("{}: {}", message, formatted.join(", "))
}

/// Human-readable rendering of a parameter value, e.g. `[1, 2]` or `"abc"`.
fn inspect(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(inspect).collect();
            format!("[{}]", inner.join(", "))
        }
        other => other.to_string(),
    }
}
