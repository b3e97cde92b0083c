//! Test support: an in-memory document store and router helpers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth;
use crate::config::{AppConfig, Environment};
use crate::database::models::{Admin, User, UserToken};
use crate::database::store::document_id;
use crate::database::{
    Collection, DatabaseError, Document, DocumentStore, InsertOneResult, Repository, UpdateResult,
};
use crate::filter::filter_match;
use crate::filter::Filter;
use crate::state::AppState;

/// Bcrypt cost used by tests; the minimum the crate accepts.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Document store held in process memory, with the same filter semantics as Postgres
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.lock().get(&collection).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("store unavailable".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Collection, Vec<Document>>> {
        self.collections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn matching(&self, collection: Collection, filter: &Filter) -> Vec<Document> {
        self.lock()
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter_match::matches(filter.conditions(), doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn lower_email(doc: &Document) -> Option<String> {
    doc.get("email").and_then(Value::as_str).map(str::to_lowercase)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        self.check()?;
        Ok(filter_match::apply_paging(filter, self.matching(collection, filter)))
    }

    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<Vec<String>, DatabaseError> {
        Ok(self
            .find(collection, filter)
            .await?
            .iter()
            .filter_map(|doc| doc.get("_id").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        self.check()?;
        Ok(self.matching(collection, filter).len() as u64)
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult, DatabaseError> {
        self.check()?;
        let id = document_id(&document)?;
        let mut collections = self.lock();
        let docs = collections.entry(collection).or_default();

        let duplicate_id = docs.iter().any(|d| d.get("_id").and_then(Value::as_str) == Some(id.as_str()));
        let duplicate_email = collection == Collection::Users
            && lower_email(&document).is_some()
            && docs.iter().any(|d| lower_email(d) == lower_email(&document));
        if duplicate_id || duplicate_email {
            return Err(DatabaseError::Duplicate(collection.name()));
        }

        docs.push(document);
        Ok(InsertOneResult { inserted_id: id })
    }

    async fn update_by_id(&self, collection: Collection, id: &str, set: Document) -> Result<UpdateResult, DatabaseError> {
        self.check()?;
        let mut collections = self.lock();
        let Some(doc) = collections
            .entry(collection)
            .or_default()
            .iter_mut()
            .find(|d| d.get("_id").and_then(Value::as_str) == Some(id))
        else {
            return Ok(UpdateResult {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let before = doc.clone();
        doc.extend(set);
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(*doc != before),
        })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }

    async fn close(&self) {}
}

/// Application wired to a fresh in-memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::preset(Environment::Development, 0, "postgres://localhost/anyshare_test");
        config.security.bcrypt_cost = TEST_BCRYPT_COST;
        config.list.max_page_size = 100;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        Self { store, state }
    }

    pub fn app(&self) -> Router {
        crate::app(self.state.clone())
    }

    /// Insert an active user directly into the store
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        self.create_user_at(email, password, Utc::now().timestamp()).await
    }

    pub async fn create_user_at(&self, email: &str, password: &str, join_time: i64) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password: auth::hash_password(password.to_string(), TEST_BCRYPT_COST)
                .await
                .unwrap(),
            full_name: format!("User {}", email),
            address: "1 Test Street".to_string(),
            desc: String::new(),
            join_time,
            delete_time: None,
        };
        Repository::<User>::new(self.state.store().clone())
            .insert(&user)
            .await
            .unwrap();
        user
    }

    pub async fn create_admin(&self, email: &str, roles: &[&str], join_time: i64) -> (Admin, User) {
        let user = self.create_user_at(email, "secret123", join_time).await;
        let admin = Admin {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            join_time,
            delete_time: None,
        };
        Repository::<Admin>::new(self.state.store().clone())
            .insert(&admin)
            .await
            .unwrap();
        (admin, user)
    }

    /// Issue a session token for the user without going through /login
    pub async fn token_for(&self, user: &User) -> String {
        let token: UserToken = auth::issue_token(self.state.store(), user, "test-agent").await.unwrap();
        token.id
    }

    pub async fn find_user(&self, id: &str) -> Option<User> {
        Repository::<User>::new(self.state.store().clone())
            .find_by_id(id)
            .await
            .unwrap()
    }

    pub async fn find_admin(&self, id: &str) -> Option<Admin> {
        Repository::<Admin>::new(self.state.store().clone())
            .find_by_id(id)
            .await
            .unwrap()
    }

    /// Run one request through the router and decode the JSON body (Null when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a request with optional bearer token and JSON body
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_rejects_duplicate_emails() {
        let store = MemoryStore::new();
        let doc = |id: &str, email: &str| match json!({ "_id": id, "email": email }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.insert_one(Collection::Users, doc("a", "x@y.co")).await.unwrap();
        let err = store.insert_one(Collection::Users, doc("b", "X@Y.co")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate("users")));
    }

    #[tokio::test]
    async fn memory_store_lists_matching_ids_only() {
        let store = MemoryStore::new();
        for (id, email) in [("a", "ann@x.co"), ("b", "bob@y.co"), ("c", "cat@x.co")] {
            let doc = match json!({ "_id": id, "email": email, "password": "hash" }) {
                Value::Object(map) => map,
                _ => unreachable!(),
            };
            store.insert_one(Collection::Users, doc).await.unwrap();
        }

        let filter = Filter::matching(json!({ "email": { "$find": "@x.co" } })).unwrap();
        let mut ids = store.find_ids(Collection::Users, &filter).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn memory_store_reports_unmodified_updates() {
        let store = MemoryStore::new();
        let doc = match json!({ "_id": "a", "n": 1 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.insert_one(Collection::Admins, doc).await.unwrap();

        let same = match json!({ "n": 1 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let r = store.update_by_id(Collection::Admins, "a", same).await.unwrap();
        assert_eq!((r.matched_count, r.modified_count), (1, 0));

        let missing = store.update_by_id(Collection::Admins, "zz", Document::new()).await.unwrap();
        assert_eq!(missing.matched_count, 0);
    }
}
