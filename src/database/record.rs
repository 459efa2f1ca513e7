use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::database::schema::RecordClass;

/// Errors that can occur during Record operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Unknown attributes for {class}: {}", .attributes.join(", "))]
    UnknownAttributes { class: &'static str, attributes: Vec<String> },
    #[error("Invalid row for {class}: {message}")]
    InvalidRow { class: &'static str, message: String },
    #[error("Invalid timestamp format for field '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },
}

/// A persistable entity instance: identity, attribute bag and timestamps,
/// described by a static [`RecordClass`].
#[derive(Debug, Clone)]
pub struct Record {
    class: &'static RecordClass,
    id: Option<i64>,
    /// Current attribute values; always holds every declared attribute
    fields: Map<String, Value>,
    /// Attribute values as last loaded from or written to the store
    original: Option<Map<String, Value>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    destroyed: bool,
}

impl Record {
    /// Create a new, unpersisted record with every attribute at its default
    pub fn new(class: &'static RecordClass) -> Self {
        Self {
            class,
            id: None,
            fields: class.defaults(),
            original: None,
            created_at: None,
            updated_at: None,
            destroyed: false,
        }
    }

    /// Create record from a stored row (system columns included)
    pub fn from_row(class: &'static RecordClass, row: Map<String, Value>) -> Result<Self, RecordError> {
        let mut record = Self::new(class);
        record.load_row(row)?;
        Ok(record)
    }

    /// Replace identity, timestamps and attributes with a stored row
    pub(crate) fn load_row(&mut self, mut row: Map<String, Value>) -> Result<&mut Self, RecordError> {
        let id = match row.remove("id") {
            Some(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
        .ok_or_else(|| RecordError::InvalidRow {
            class: self.class.name,
            message: "missing integer id".to_string(),
        })?;

        self.created_at = parse_timestamp("created_at", row.remove("created_at"))?;
        self.updated_at = parse_timestamp("updated_at", row.remove("updated_at"))?;

        for attribute in self.class.attributes {
            let value = row.remove(attribute.name).unwrap_or_else(|| attribute.default.to_value());
            self.fields.insert(attribute.name.to_string(), value);
        }

        self.id = Some(id);
        self.original = Some(self.fields.clone());
        self.destroyed = false;
        Ok(self)
    }

    pub fn class(&self) -> &'static RecordClass {
        self.class
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stored and not destroyed
    pub fn is_persisted(&self) -> bool {
        self.id.is_some() && !self.destroyed
    }

    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn mark_destroyed(&mut self) -> &mut Self {
        self.destroyed = true;
        self
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Keys the record class does not declare, sorted
    pub fn unknown_attributes<'a>(&self, attributes: &'a Map<String, Value>) -> Vec<&'a str> {
        let mut unknown: Vec<&str> = attributes
            .keys()
            .filter(|key| !self.class.has_attribute(key))
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Assign several attributes at once, casting each to its declared kind.
    ///
    /// Nothing is assigned when any key is unknown.
    pub fn assign_attributes(&mut self, attributes: &Map<String, Value>) -> Result<&mut Self, RecordError> {
        let unknown = self.unknown_attributes(attributes);
        if !unknown.is_empty() {
            return Err(RecordError::UnknownAttributes {
                class: self.class.name,
                attributes: unknown.into_iter().map(String::from).collect(),
            });
        }

        for (key, value) in attributes {
            self.write_attribute(key, value);
        }
        Ok(self)
    }

    /// Set a single attribute
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self, RecordError> {
        if !self.class.has_attribute(key) {
            return Err(RecordError::UnknownAttributes {
                class: self.class.name,
                attributes: vec![key.to_string()],
            });
        }
        self.write_attribute(key, &value.into());
        Ok(self)
    }

    fn write_attribute(&mut self, key: &str, value: &Value) {
        if let Some(attribute) = self.class.attribute(key) {
            self.fields.insert(key.to_string(), attribute.kind.cast(value));
        }
    }

    // ========================================
    // Change tracking
    // ========================================

    /// Check if a specific field has been changed since the last load or save
    pub fn changed(&self, key: &str) -> bool {
        match &self.original {
            Some(original) => original.get(key) != self.fields.get(key),
            None => true,
        }
    }

    /// Check if record has any unsaved changes
    pub fn has_changes(&self) -> bool {
        match &self.original {
            Some(original) => original != &self.fields,
            None => true,
        }
    }

    /// Changed fields and their current values
    pub fn changes(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(key, _)| self.changed(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get original value for a specific field
    pub fn get_original(&self, key: &str) -> Option<&Value> {
        self.original.as_ref()?.get(key)
    }

    // ========================================
    // Serialization
    // ========================================

    /// Attribute columns only, as written to the store
    pub fn to_row(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    /// Convert to API output format (includes system fields)
    pub fn to_api_output(&self) -> Value {
        let mut output = Map::new();
        output.insert("id".to_string(), self.id.map(Value::from).unwrap_or(Value::Null));
        for (key, value) in &self.fields {
            output.insert(key.clone(), value.clone());
        }
        output.insert("created_at".to_string(), timestamp_value(self.created_at));
        output.insert("updated_at".to_string(), timestamp_value(self.updated_at));
        Value::Object(output)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.id == other.id
            && self.fields == other.fields
            && self.destroyed == other.destroyed
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.to_api_output()
    }
}

impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_api_output().serialize(serializer)
    }
}

/// Extension trait for Vec<Record> to add convenient JSON conversion methods
pub trait RecordVecExt {
    /// Convert to API output JSON array
    fn to_api(&self) -> Value;
}

impl RecordVecExt for Vec<Record> {
    fn to_api(&self) -> Value {
        Value::Array(self.iter().map(Record::to_api_output).collect())
    }
}

fn parse_timestamp(field: &str, value: Option<Value>) -> Result<Option<DateTime<Utc>>, RecordError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| RecordError::InvalidTimestamp { field: field.to_string(), value: s }),
        Some(other) => Err(RecordError::InvalidTimestamp {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn timestamp_value(timestamp: Option<DateTime<Utc>>) -> Value {
    timestamp.map(|t| Value::String(t.to_rfc3339())).unwrap_or(Value::Null)
}

// ========================================
// Display
// ========================================

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(id: {:?}, persisted: {}, changed: {})",
            self.class.name,
            self.id,
            self.is_persisted(),
            self.has_changes()
        )
    }
}
