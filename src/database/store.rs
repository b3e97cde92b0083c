use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::Filter;

pub type Document = Map<String, Value>;

/// Named collections persisted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Admins,
    UserTokens,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Admins => "admins",
            Collection::UserTokens => "user_tokens",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Generic document operations against named collections.
///
/// Each call is atomic for a single document; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    /// Ids of the documents matching the filter, without loading the documents.
    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<Vec<String>, DatabaseError>;

    /// Counts documents matching the filter's conditions; sort and paging are ignored.
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError>;

    /// The document must carry a string `_id`.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult, DatabaseError>;

    /// Shallow-merges `set` into the document with the given `_id`.
    async fn update_by_id(&self, collection: Collection, id: &str, set: Document) -> Result<UpdateResult, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}

pub(crate) fn document_id(document: &Document) -> Result<String, DatabaseError> {
    document
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DatabaseError::MalformedDocument("document is missing a string _id".to_string()))
}
