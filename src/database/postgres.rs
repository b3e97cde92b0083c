use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Row};

use crate::config::DatabaseConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{document_id, Collection, Document, DocumentStore, InsertOneResult, UpdateResult};
use crate::filter::Filter;

/// Document store backed by one JSONB table per collection
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect(config).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        QueryBuilder::new(collection.name(), filter)
            .select_optional(&self.pool)
            .await
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        QueryBuilder::new(collection.name(), filter)
            .select_all(&self.pool)
            .await
    }

    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<Vec<String>, DatabaseError> {
        QueryBuilder::new(collection.name(), filter)
            .select_ids(&self.pool)
            .await
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        QueryBuilder::new(collection.name(), filter)
            .count(&self.pool)
            .await
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult, DatabaseError> {
        let id = document_id(&document)?;
        let query = format!(r#"INSERT INTO "{}" ("id", "doc") VALUES ($1, $2)"#, collection.name());

        let result = sqlx::query(&query)
            .bind(&id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(InsertOneResult { inserted_id: id }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DatabaseError::Duplicate(collection.name()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_id(&self, collection: Collection, id: &str, set: Document) -> Result<UpdateResult, DatabaseError> {
        let table = collection.name();
        // A merge that leaves the document unchanged counts as matched but not modified.
        let query = format!(
            r#"WITH target AS (
                SELECT "id", "doc" FROM "{table}" WHERE "id" = $1
            ), updated AS (
                UPDATE "{table}" u SET "doc" = u."doc" || $2
                FROM target t
                WHERE u."id" = t."id" AND t."doc" <> (t."doc" || $2)
                RETURNING u."id"
            )
            SELECT (SELECT COUNT(*) FROM target) AS matched,
                   (SELECT COUNT(*) FROM updated) AS modified"#
        );

        let result = sqlx::query(&query)
            .bind(id)
            .bind(Json(Value::Object(set)))
            .fetch_one(&self.pool)
            .await;

        let row = match result {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DatabaseError::Duplicate(table));
            }
            Err(e) => return Err(e.into()),
        };

        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult {
            matched_count: matched.max(0) as u64,
            modified_count: modified.max(0) as u64,
        })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn close(&self) {
        DatabaseManager::close(&self.pool).await;
    }
}
