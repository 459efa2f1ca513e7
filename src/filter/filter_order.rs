use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses an order specification.
    ///
    /// Accepts `null`, a string such as `"company_name:asc::created_at:desc"`,
    /// or an object such as `{ "company_name": "asc" }`.
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Object(obj) => {
                let mut out = Vec::with_capacity(obj.len());
                for (column, direction) in obj {
                    let sort = direction
                        .as_str()
                        .and_then(SortDirection::parse)
                        .ok_or_else(|| FilterError::InvalidOrder(format!("{}: {}", column, direction)))?;
                    Self::validate_column(column)?;
                    out.push(FilterOrderInfo { column: column.clone(), sort });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOrder(other.to_string())),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split("::") {
            if part.is_empty() {
                continue;
            }
            let (column, direction) = part
                .split_once(':')
                .ok_or_else(|| FilterError::InvalidOrder(part.to_string()))?;
            let column = column.trim();
            let sort = SortDirection::parse(direction)
                .ok_or_else(|| FilterError::InvalidOrder(part.to_string()))?;
            if column.is_empty() {
                return Err(FilterError::InvalidOrder(part.to_string()));
            }
            Self::validate_column(column)?;
            out.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(out)
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid = !column.is_empty()
            && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| {
                Self::validate_column(&i.column)?;
                Ok(format!("\"{}\" {}", i.column, i.sort.to_sql()))
            })
            .collect::<Result<_, FilterError>>()?;
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_compound_string() {
        let order = FilterOrder::validate_and_parse(&json!("company_name:asc::created_at:descending"))
            .unwrap();

        assert_eq!(
            order,
            vec![FilterOrderInfo::asc("company_name"), FilterOrderInfo::desc("created_at")]
        );
    }

    #[test]
    fn test_empty_and_null_orders() {
        assert!(FilterOrder::validate_and_parse(&json!("")).unwrap().is_empty());
        assert!(FilterOrder::validate_and_parse(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_missing_or_unknown_direction() {
        assert!(FilterOrder::validate_and_parse(&json!("company_name")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!("company_name:sideways")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!(":asc")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!({ "title": 1 })).is_err());
        assert!(FilterOrder::validate_and_parse(&json!(["title"])).is_err());
    }

    #[test]
    fn test_rejects_unsafe_columns() {
        let err = FilterOrder::validate_and_parse(&json!("name; drop table jobs:asc")).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }

    #[test]
    fn test_generates_order_by() {
        let sql = FilterOrder::generate(&[
            FilterOrderInfo::desc("year"),
            FilterOrderInfo::desc("month"),
        ])
        .unwrap();
        assert_eq!(sql, "ORDER BY \"year\" DESC, \"month\" DESC");
        assert_eq!(FilterOrder::generate(&[]).unwrap(), "");
    }
}
