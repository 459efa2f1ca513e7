use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, SqlResult};

/// SQL generator for single-table record queries. Rows come back as one
/// JSON object per row in the `row` column.
pub struct Filter {
    table_name: String,
    data: FilterData,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self { table_name, data: FilterData::default() })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(limit) = data.limit {
            if limit < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        self.data = data;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.data.conditions, 1)?;
        let order_clause = FilterOrder::generate(&self.data.order)?;

        let mut inner = format!("SELECT * FROM \"{}\" WHERE {}", self.table_name, where_clause);
        if !order_clause.is_empty() {
            inner.push(' ');
            inner.push_str(&order_clause);
        }
        if let Some(limit) = self.data.limit {
            inner.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM ({}) t", inner),
            params,
        })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let valid = !name.is_empty()
            && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidTableName(name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::FilterOrderInfo;
    use serde_json::json;

    #[test]
    fn test_to_sql_with_conditions_order_and_limit() {
        let mut filter = Filter::new("time_periods").unwrap();
        filter
            .assign(
                FilterData::with_order(vec![
                    FilterOrderInfo::desc("year"),
                    FilterOrderInfo::desc("month"),
                ])
                .condition("year", 2024)
                .limit(1),
            )
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"time_periods\" WHERE to_jsonb(\"year\") = $1 ORDER BY \"year\" DESC, \"month\" DESC LIMIT 1) t"
        );
        assert_eq!(sql.params, vec![json!(2024)]);
    }

    #[test]
    fn test_rejects_bad_table_names() {
        assert!(Filter::new("jobs; --").is_err());
        assert!(Filter::new("").is_err());
    }

    #[test]
    fn test_rejects_negative_limit() {
        let mut filter = Filter::new("jobs").unwrap();
        assert!(filter.assign(FilterData::default().limit(-1)).is_err());
    }
}
