use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::database::store::Store;
use crate::database::validation::Validation;
use crate::operations::records::Factory;

/// Columns every table carries in addition to its declared attributes.
pub const SYSTEM_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

/// String forms that cast to `false`, compared lowercased.
const BOOLEAN_FALSE: &[&str] = &["0", "f", "false", "off"];

/// Storage kind of an attribute, used to cast inbound values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Text,
    Integer,
    Boolean,
    Json,
    /// Integer foreign key to another record class.
    Reference,
}

/// Compile-time default for an attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    EmptyObject,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::EmptyObject => Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeDef {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub default: DefaultValue,
}

impl AttributeDef {
    pub const fn new(name: &'static str, kind: AttributeKind, default: DefaultValue) -> Self {
        Self { name, kind, default }
    }
}

/// Another class whose rows point at this one through `foreign_key`.
/// Records that still have dependents cannot be destroyed.
#[derive(Debug)]
pub struct Dependent {
    pub class: &'static RecordClass,
    pub foreign_key: &'static str,
    /// Plural used in the error, e.g. `"jobs"`.
    pub name: &'static str,
}

/// Builds the operation factory for a record class that customizes it.
pub type FactoryOverride = fn(&'static RecordClass, Arc<dyn Store>) -> Factory;

/// Static description of a persistable entity type.
pub struct RecordClass {
    /// Type name used in messages, e.g. `"TimePeriod"`.
    pub name: &'static str,
    pub table: &'static str,
    pub attributes: &'static [AttributeDef],
    pub validations: &'static [Validation],
    pub dependents: &'static [Dependent],
    pub factory: Option<FactoryOverride>,
}

impl RecordClass {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Declared attributes plus the system columns.
    pub fn has_column(&self, name: &str) -> bool {
        SYSTEM_COLUMNS.contains(&name) || self.has_attribute(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|a| a.name)
    }

    /// Every attribute at its declared default.
    pub fn defaults(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .map(|a| (a.name.to_string(), a.default.to_value()))
            .collect()
    }
}

impl PartialEq for RecordClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for RecordClass {}

impl fmt::Debug for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordClass")
            .field("name", &self.name)
            .field("table", &self.table)
            .finish()
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl AttributeKind {
    /// Casts an inbound value to this kind.
    ///
    /// Values that cannot be cast are kept as given so that validation can
    /// report them; blank strings become null for non-text kinds. Booleans
    /// are the exception: every non-blank value casts, and anything that is
    /// not one of the false forms is true.
    pub fn cast(&self, value: &Value) -> Value {
        match self {
            AttributeKind::Json => value.clone(),
            AttributeKind::String | AttributeKind::Text => match value {
                Value::Number(n) => Value::String(n.to_string()),
                Value::Bool(b) => Value::String(b.to_string()),
                other => other.clone(),
            },
            AttributeKind::Integer | AttributeKind::Reference => match value {
                Value::String(s) if s.trim().is_empty() => Value::Null,
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(i) => Value::from(i),
                    Err(_) => value.clone(),
                },
                other => other.clone(),
            },
            AttributeKind::Boolean => match value {
                Value::Null | Value::Bool(_) => value.clone(),
                Value::String(s) if s.is_empty() => Value::Null,
                Value::String(s) => Value::Bool(!BOOLEAN_FALSE.contains(&s.to_ascii_lowercase().as_str())),
                Value::Number(n) => Value::Bool(n.as_f64() != Some(0.0)),
                _ => Value::Bool(true),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_cast() {
        let kind = AttributeKind::Integer;
        assert_eq!(kind.cast(&json!("12")), json!(12));
        assert_eq!(kind.cast(&json!(" ")), Value::Null);
        assert_eq!(kind.cast(&json!("twelve")), json!("twelve"));
        assert_eq!(kind.cast(&json!(3)), json!(3));
    }

    #[test]
    fn test_boolean_cast() {
        let kind = AttributeKind::Boolean;
        assert_eq!(kind.cast(&json!("false")), json!(false));
        assert_eq!(kind.cast(&json!("1")), json!(true));
        assert_eq!(kind.cast(&json!(0)), json!(false));
        assert_eq!(kind.cast(&json!("")), Value::Null);
        assert_eq!(kind.cast(&json!("OFF")), json!(false));
        assert_eq!(kind.cast(&json!("maybe")), json!(true));
        assert_eq!(kind.cast(&json!(2)), json!(true));
        assert_eq!(kind.cast(&json!({ "x": 1 })), json!(true));
        assert_eq!(kind.cast(&Value::Null), Value::Null);
    }

    #[test]
    fn test_string_cast() {
        assert_eq!(AttributeKind::String.cast(&json!(42)), json!("42"));
        assert_eq!(AttributeKind::Text.cast(&json!("notes")), json!("notes"));
    }
}
