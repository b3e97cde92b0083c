use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, Document, DocumentStore, InsertOneResult, UpdateResult};
use crate::filter::Filter;

/// A typed record stored as a document in a fixed collection
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.select_one(Filter::matching(json!({ "_id": id }))?).await
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        self.store
            .find_one(T::COLLECTION, &filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find(T::COLLECTION, &filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find_ids(&self, filter: Filter) -> Result<Vec<String>, DatabaseError> {
        self.store.find_ids(T::COLLECTION, &filter).await
    }

    pub async fn count(&self, filter: Filter) -> Result<u64, DatabaseError> {
        self.store.count(T::COLLECTION, &filter).await
    }

    pub async fn select_ids(&self, ids: &[String]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select_any(Filter::matching(json!({ "_id": { "$in": ids } }))?).await
    }

    pub async fn insert(&self, record: &T) -> Result<InsertOneResult, DatabaseError> {
        self.store.insert_one(T::COLLECTION, to_document(record)?).await
    }

    /// Merges the given fields into the stored document.
    pub async fn update(&self, id: &str, set: Value) -> Result<UpdateResult, DatabaseError> {
        match set {
            Value::Object(fields) => self.store.update_by_id(T::COLLECTION, id, fields).await,
            other => Err(DatabaseError::MalformedDocument(format!("update must be an object, found {}", other))),
        }
    }
}

pub fn to_document<T: Serialize>(record: &T) -> Result<Document, DatabaseError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::MalformedDocument(format!("expected object, found {}", other))),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
