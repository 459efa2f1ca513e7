//! Naming and routing metadata for a record class exposed over HTTP.

use std::sync::Arc;

use thiserror::Error;

use crate::database::schema::RecordClass;
use crate::database::store::Store;
use crate::filter::FilterOrderInfo;
use crate::operations::records::Factory;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("must provide a record class or a name")]
    MissingName,

    #[error("resource '{0}' has no record class")]
    MissingRecordClass(String),
}

/// Explicit names; anything left out is derived.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    pub name: Option<String>,
    pub plural_name: Option<String>,
    pub singular_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Resource {
    record_class: Option<&'static RecordClass>,
    name: String,
    plural_name: String,
    singular_name: String,
    default_order: Vec<FilterOrderInfo>,
}

impl Resource {
    pub fn new(record_class: Option<&'static RecordClass>, options: ResourceOptions) -> Result<Self, ResourceError> {
        let name = match (options.name.as_deref().filter(|n| !n.trim().is_empty()), record_class) {
            (Some(name), _) => underscore(name),
            (None, Some(class)) => underscore(class.name),
            (None, None) => return Err(ResourceError::MissingName),
        };

        let plural_name = options.plural_name.as_deref().map(underscore).unwrap_or_else(|| pluralize(&name));
        let singular_name = options
            .singular_name
            .as_deref()
            .map(underscore)
            .unwrap_or_else(|| singularize(&name));

        Ok(Self {
            record_class,
            name,
            plural_name,
            singular_name,
            default_order: Vec::new(),
        })
    }

    /// Resource named after its record class.
    pub fn for_class(record_class: &'static RecordClass) -> Self {
        let name = underscore(record_class.name);
        Self {
            record_class: Some(record_class),
            plural_name: pluralize(&name),
            singular_name: singularize(&name),
            name,
            default_order: Vec::new(),
        }
    }

    /// Order for listings when the caller gives none. Empty defers to the
    /// FindMatching default.
    pub fn with_default_order(mut self, order: Vec<FilterOrderInfo>) -> Self {
        self.default_order = order;
        self
    }

    pub fn record_class(&self) -> Option<&'static RecordClass> {
        self.record_class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    pub fn singular_name(&self) -> &str {
        &self.singular_name
    }

    pub fn default_order(&self) -> &[FilterOrderInfo] {
        &self.default_order
    }

    pub fn index_path(&self) -> String {
        format!("/{}", self.plural_name)
    }

    pub fn show_path(&self, id: i64) -> String {
        format!("{}/{}", self.index_path(), id)
    }

    pub fn operation_factory(&self, store: Arc<dyn Store>) -> Result<Factory, ResourceError> {
        let record_class = self
            .record_class
            .ok_or_else(|| ResourceError::MissingRecordClass(self.name.clone()))?;
        Ok(Factory::for_class(record_class, store))
    }
}

/// `TimePeriod` and `time-period` both become `time_period`.
pub fn underscore(value: &str) -> String {
    let last_segment = value.rsplit("::").next().unwrap_or(value).trim();
    let mut out = String::with_capacity(last_segment.len() + 4);
    let mut prev: Option<char> = None;
    let chars: Vec<char> = last_segment.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c.is_whitespace() {
            out.push('_');
        } else if c.is_ascii_uppercase() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next_is_lower,
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    out
}

pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if ["ss", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{}es", word);
    }
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", word)
}

pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::{JOB, TIME_PERIOD};

    #[test]
    fn test_names_from_record_class() {
        let resource = Resource::new(Some(&TIME_PERIOD), ResourceOptions::default()).unwrap();

        assert_eq!(resource.name(), "time_period");
        assert_eq!(resource.singular_name(), "time_period");
        assert_eq!(resource.plural_name(), "time_periods");
        assert_eq!(resource.index_path(), "/time_periods");
        assert_eq!(resource.show_path(3), "/time_periods/3");
    }

    #[test]
    fn test_explicit_names() {
        let resource = Resource::new(
            Some(&JOB),
            ResourceOptions {
                name: Some("Listings".to_string()),
                singular_name: Some("posting".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(resource.name(), "listings");
        assert_eq!(resource.plural_name(), "listings");
        assert_eq!(resource.singular_name(), "posting");
    }

    #[test]
    fn test_requires_class_or_name() {
        assert_eq!(
            Resource::new(None, ResourceOptions::default()).unwrap_err(),
            ResourceError::MissingName
        );

        let nameless = Resource::new(None, ResourceOptions { name: Some("resource".into()), ..Default::default() })
            .unwrap();
        assert_eq!(nameless.plural_name(), "resources");
        assert_eq!(
            nameless.operation_factory(Arc::new(MemoryStore::new())).unwrap_err(),
            ResourceError::MissingRecordClass("resource".to_string())
        );
    }

    #[test]
    fn test_operation_factory_is_bound() {
        let factory = Resource::for_class(&JOB).operation_factory(Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(factory.record_class(), &JOB);
    }

    #[test]
    fn test_inflections() {
        assert_eq!(underscore("TimePeriod"), "time_period");
        assert_eq!(underscore("Records::HTTPRequest"), "http_request");
        assert_eq!(underscore("job-type"), "job_type");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("jobs"), "job");
    }
}
