use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::{debug, info};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::schema::RecordClass;
use crate::database::store::{Row, Store};
use crate::filter::{Filter, FilterData};

/// Tables for both record classes. Idempotent.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "time_periods" (
        "id" BIGSERIAL PRIMARY KEY,
        "month" INTEGER NOT NULL,
        "year" INTEGER NOT NULL,
        "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "index_time_periods_on_year_and_month"
        ON "time_periods" ("year", "month")"#,
    r#"CREATE TABLE IF NOT EXISTS "jobs" (
        "id" BIGSERIAL PRIMARY KEY,
        "action_required" BOOLEAN NOT NULL DEFAULT TRUE,
        "application_active" BOOLEAN NOT NULL DEFAULT TRUE,
        "application_status" VARCHAR NOT NULL,
        "company_name" VARCHAR NOT NULL,
        "data" JSONB NOT NULL DEFAULT '{}',
        "job_type" VARCHAR NOT NULL DEFAULT '',
        "notes" TEXT NOT NULL DEFAULT '',
        "recruiter_agency" VARCHAR NOT NULL DEFAULT '',
        "recruiter_name" VARCHAR NOT NULL DEFAULT '',
        "source" VARCHAR NOT NULL,
        "source_data" JSONB NOT NULL DEFAULT '{}',
        "time_period_id" BIGINT REFERENCES "time_periods" ("id"),
        "title" VARCHAR NOT NULL DEFAULT '',
        "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS "index_jobs_on_action_required_and_company_name"
        ON "jobs" ("action_required", "company_name")"#,
    r#"CREATE INDEX IF NOT EXISTS "index_jobs_on_application_status_and_company_name"
        ON "jobs" ("application_status", "company_name")"#,
    r#"CREATE INDEX IF NOT EXISTS "index_jobs_on_company_name" ON "jobs" ("company_name")"#,
    r#"CREATE INDEX IF NOT EXISTS "index_jobs_on_time_period_id" ON "jobs" ("time_period_id")"#,
];

/// PostgreSQL-backed store. Rows travel as JSON in both directions.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store on the configured DATABASE_URL
    pub async fn connect() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::main_pool().await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Quoted attribute column list, in declaration order
    fn column_list(class: &RecordClass) -> String {
        class
            .attribute_names()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DatabaseError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(Json(param));
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(|row| decode_row(&row)).collect()
    }

    async fn fetch_written_row(&self, sql: &str, attributes: Row, id: Option<i64>) -> Result<Row, DatabaseError> {
        let mut query = sqlx::query(sql).bind(Json(Value::Object(attributes)));
        if let Some(id) = id {
            query = query.bind(id);
        }

        match query.fetch_optional(&self.pool).await? {
            Some(row) => decode_row(&row),
            None => Err(DatabaseError::NotFound(sql.to_string())),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, class: &'static RecordClass, id: i64) -> Result<Option<Row>, DatabaseError> {
        let filter = FilterData::default().condition("id", id).limit(1);
        Ok(self.find_all(class, &filter).await?.into_iter().next())
    }

    async fn find_many(&self, class: &'static RecordClass, ids: &[i64]) -> Result<Vec<Row>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = FilterData::default().condition("id", ids.to_vec());
        self.find_all(class, &filter).await
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

        let mut query = Filter::new(class.table)?;
        query.assign(filter.clone())?;
        let sql = query.to_sql()?;

        debug!("Executing on {}: {}", class.table, sql.query);
        self.fetch_rows(&sql.query, sql.params).await
    }

    async fn insert(&self, class: &'static RecordClass, attributes: Row) -> Result<Row, DatabaseError> {
        let columns = Self::column_list(class);
        let sql = format!(
            "WITH inserted AS (INSERT INTO \"{table}\" ({columns}) SELECT {columns} FROM json_populate_record(NULL::\"{table}\", $1::json) RETURNING *) SELECT row_to_json(inserted) AS row FROM inserted",
            table = class.table,
            columns = columns,
        );

        let row = self.fetch_written_row(&sql, attributes, None).await?;
        debug!("Inserted into {}: {:?}", class.table, row.get("id"));
        Ok(row)
    }

    async fn update(&self, class: &'static RecordClass, id: i64, attributes: Row) -> Result<Row, DatabaseError> {
        let columns = Self::column_list(class);
        let sql = format!(
            "WITH updated AS (UPDATE \"{table}\" SET ({columns}, \"updated_at\") = (SELECT {columns}, now() FROM json_populate_record(NULL::\"{table}\", $1::json)) WHERE \"id\" = $2 RETURNING *) SELECT row_to_json(updated) AS row FROM updated",
            table = class.table,
            columns = columns,
        );

        self.fetch_written_row(&sql, attributes, Some(id)).await.map_err(|err| match err {
            DatabaseError::NotFound(_) => DatabaseError::NotFound(format!("{} row {}", class.table, id)),
            other => other,
        })
    }

    async fn delete(&self, class: &'static RecordClass, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", class.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<Row, DatabaseError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("Expected a JSON object row, got {}", other))),
    }
}
