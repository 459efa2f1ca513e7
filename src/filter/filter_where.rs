use serde_json::{Map, Value};

use super::error::FilterError;

/// Builds a parameterized WHERE clause from equality conditions.
///
/// Values are compared as JSONB so that a single bound parameter type works
/// for every column kind.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(
        conditions: &Map<String, Value>,
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &Map<String, Value>) -> Result<(String, Vec<Value>), FilterError> {
        for (column, value) in conditions {
            Self::validate_column(column)?;
            let clause = match value {
                Value::Null => format!("\"{}\" IS NULL", column),
                Value::Array(_) => {
                    let param = self.push_param(value.clone());
                    format!("to_jsonb(\"{}\") IN (SELECT jsonb_array_elements({}))", column, param)
                }
                _ => {
                    let param = self.push_param(value.clone());
                    format!("to_jsonb(\"{}\") = {}", column, param)
                }
            };
            self.conditions.push(clause);
        }

        let where_clause = if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        };

        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn push_param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        let placeholder = format!("${}", self.param_index);
        self.param_index += 1;
        placeholder
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        if !column.is_empty() && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_equality_and_membership() {
        let mut conditions = Map::new();
        conditions.insert("application_status".into(), json!("applied"));
        conditions.insert("id".into(), json!([1, 2]));
        conditions.insert("title".into(), Value::Null);

        let (clause, params) = FilterWhere::generate(&conditions, 1).unwrap();

        assert_eq!(
            clause,
            "to_jsonb(\"application_status\") = $1 AND to_jsonb(\"id\") IN (SELECT jsonb_array_elements($2)) AND \"title\" IS NULL"
        );
        assert_eq!(params, vec![json!("applied"), json!([1, 2])]);
    }

    #[test]
    fn test_empty_conditions_match_everything() {
        let (clause, params) = FilterWhere::generate(&Map::new(), 1).unwrap();
        assert_eq!(clause, "1=1");
        assert!(params.is_empty());
    }
}
