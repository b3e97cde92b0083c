use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::database::models::{User, UserView};
use crate::database::{DatabaseError, DocumentStore, InsertOneResult, Repository, UpdateResult};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::i18n::{Locale, Message};
use crate::middleware::parse_id;
use crate::query::{ListQuery, Page};
use crate::validation::{Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub desc: String,
}

impl Validate for CreateUserForm {
    fn rules(&self, v: &mut Validator) {
        v.required("email", &self.email).email("email", &self.email);
        v.required("password", &self.password)
            .min_len("password", &self.password, 7)
            .max_len("password", &self.password, 50);
        profile_rules(v, &self.full_name, &self.address, &self.desc);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserForm {
    pub id: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub desc: String,
}

impl Validate for UpdateUserForm {
    fn rules(&self, v: &mut Validator) {
        v.required("id", &self.id);
        if !self.password.is_empty() {
            v.min_len("password", &self.password, 7)
                .max_len("password", &self.password, 50);
        }
        profile_rules(v, &self.full_name, &self.address, &self.desc);
    }
}

/// fullName, address and desc share their limits across every form
pub(crate) fn profile_rules(v: &mut Validator, full_name: &str, address: &str, desc: &str) {
    v.required("fullName", full_name).max_len("fullName", full_name, 50);
    v.required("address", address).max_len("address", address, 250);
    v.max_len("desc", desc, 1000);
}

/// Email uniqueness is enforced by the store; surface it on the form field.
pub(crate) fn map_duplicate(err: DatabaseError, locale: Locale) -> ApiError {
    match err {
        DatabaseError::Duplicate(_) => ApiError::field("email", Message::EmailExists, locale),
        other => other.into(),
    }
}

pub struct UserService {
    users: Repository<User>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, bcrypt_cost: u32) -> Self {
        Self {
            users: Repository::new(store),
            bcrypt_cost,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<UserView>, ApiError> {
        let conditions = query.conditions("email");
        let count = self.users.count(Filter::matching(conditions.clone())?).await?;
        let items = self.users.select_any(query.page_filter(conditions)?).await?;
        Ok(Page::new(items.into_iter().map(UserView::from).collect(), query, count))
    }

    /// Soft-deleted users are still returned by id.
    pub async fn get(&self, raw_id: &str) -> Result<UserView, ApiError> {
        let id = parse_id(raw_id)?;
        self.users
            .find_by_id(&id)
            .await?
            .map(UserView::from)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn create(&self, form: &CreateUserForm, locale: Locale) -> Result<InsertOneResult, ApiError> {
        form.validate(locale)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: form.email.trim().to_lowercase(),
            password: auth::hash_password(form.password.clone(), self.bcrypt_cost).await?,
            full_name: form.full_name.clone(),
            address: form.address.clone(),
            desc: form.desc.clone(),
            join_time: Utc::now().timestamp(),
            delete_time: None,
        };

        let result = self.users.insert(&user).await.map_err(|e| map_duplicate(e, locale))?;
        info!("Created user {} <{}>", user.id, user.email);
        Ok(result)
    }

    pub async fn update(&self, form: &UpdateUserForm, locale: Locale) -> Result<UpdateResult, ApiError> {
        form.validate(locale)?;
        let id = parse_id(&form.id)?;
        self.update_fields(&id, &form.full_name, &form.address, &form.desc, &form.password)
            .await
    }

    /// Overwrite profile fields of a live user; an empty password keeps the stored hash.
    pub(crate) async fn update_fields(
        &self,
        id: &str,
        full_name: &str,
        address: &str,
        desc: &str,
        password: &str,
    ) -> Result<UpdateResult, ApiError> {
        match self.users.find_by_id(id).await? {
            Some(user) if !user.is_deleted() => {}
            _ => return Err(ApiError::not_found("User not found")),
        }

        let mut set = Map::new();
        set.insert("fullName".to_string(), json!(full_name));
        set.insert("address".to_string(), json!(address));
        set.insert("desc".to_string(), json!(desc));
        if !password.is_empty() {
            let hash = auth::hash_password(password.to_string(), self.bcrypt_cost).await?;
            set.insert("password".to_string(), json!(hash));
        }

        Ok(self.users.update(id, Value::Object(set)).await?)
    }

    /// Repeating a delete succeeds and refreshes the timestamp.
    pub async fn delete(&self, raw_id: &str) -> Result<UpdateResult, ApiError> {
        let id = parse_id(raw_id)?;
        if self.users.find_by_id(&id).await?.is_none() {
            return Err(ApiError::not_found("User not found"));
        }

        let result = self
            .users
            .update(&id, json!({ "deleteTime": Utc::now().timestamp() }))
            .await?;
        info!("Soft-deleted user {}", id);
        Ok(result)
    }
}
