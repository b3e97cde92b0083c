use serde_json::Value;
use sqlx::{postgres::PgArguments, types::Json, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::store::Document;
use crate::filter::types::SqlResult;
use crate::filter::Filter;

/// Runs compiled filters against one collection table
pub struct QueryBuilder<'a> {
    table_name: &'static str,
    filter: &'a Filter,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table_name: &'static str, filter: &'a Filter) -> Self {
        Self { table_name, filter }
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<Document>, DatabaseError> {
        let sql_result = self.filter.to_sql(self.table_name)?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter().map(|row| row_document(row)).collect()
    }

    pub async fn select_ids(self, pool: &PgPool) -> Result<Vec<String>, DatabaseError> {
        let sql_result = self.filter.to_id_sql(self.table_name)?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("id").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<Document>, DatabaseError> {
        let mut limited = self.filter.clone();
        limited.limit(1, self.filter.offset_value())?;
        let sql_result = limited.to_sql(self.table_name)?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        row.as_ref().map(row_document).transpose()
    }

    pub async fn count(self, pool: &PgPool) -> Result<u64, DatabaseError> {
        let SqlResult { query, params } = self.filter.to_count_sql(self.table_name)?;
        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }
}

fn row_document(row: &sqlx::postgres::PgRow) -> Result<Document, DatabaseError> {
    let Json(doc): Json<Value> = row.try_get("doc")?;
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::MalformedDocument(format!("expected object, found {}", other))),
    }
}

/// Every filter operand is compared against JSONB, so it is bound as JSONB.
fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    q.bind(Json(v))
}
