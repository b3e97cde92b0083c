use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Admin, AdminView, User, UserView};
use crate::database::{DocumentStore, InsertOneResult, Repository, UpdateResult};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::i18n::Locale;
use crate::middleware::parse_id;
use crate::query::{keyword_condition, ListQuery, Page};
use crate::services::users::{CreateUserForm, UpdateUserForm, UserService};
use crate::validation::{Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAdminForm {
    #[serde(flatten)]
    pub user: CreateUserForm,
    pub roles: Option<Vec<String>>,
}

impl Validate for CreateAdminForm {
    fn rules(&self, v: &mut Validator) {
        self.user.rules(v);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAdminForm {
    #[serde(flatten)]
    pub user: UpdateUserForm,
    pub roles: Option<Vec<String>>,
}

impl Validate for UpdateAdminForm {
    fn rules(&self, v: &mut Validator) {
        self.user.rules(v);
    }
}

pub struct AdminService {
    admins: Repository<Admin>,
    users: Repository<User>,
    accounts: UserService,
}

impl AdminService {
    pub fn new(store: Arc<dyn DocumentStore>, bcrypt_cost: u32) -> Self {
        Self {
            admins: Repository::new(store.clone()),
            users: Repository::new(store.clone()),
            accounts: UserService::new(store, bcrypt_cost),
        }
    }

    /// Admins whose user email contains the keyword, joined with their accounts.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<AdminView>, ApiError> {
        let user_ids = match &query.keyword {
            Some(keyword) => Some(self.user_ids_matching(keyword).await?),
            None => None,
        };
        let conditions = query.conditions_by_reference("userId", user_ids);

        let count = self.admins.count(Filter::matching(conditions.clone())?).await?;
        let admins = self.admins.select_any(query.page_filter(conditions)?).await?;
        let items = self.join_users(admins).await?;
        Ok(Page::new(items, query, count))
    }

    pub async fn get(&self, raw_id: &str) -> Result<AdminView, ApiError> {
        let id = parse_id(raw_id)?;
        let admin = self
            .admins
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::not_found("Admin not found"))?;
        let user = self.users.find_by_id(&admin.user_id).await?.map(UserView::from);
        Ok(AdminView::new(admin, user))
    }

    /// Creates the user account, then its admin record.
    pub async fn create(&self, form: &CreateAdminForm, locale: Locale) -> Result<InsertOneResult, ApiError> {
        form.validate(locale)?;
        let account = self.accounts.create(&form.user, locale).await?;

        let admin = Admin {
            id: Uuid::new_v4().to_string(),
            user_id: account.inserted_id,
            roles: form.roles.clone().unwrap_or_default(),
            join_time: Utc::now().timestamp(),
            delete_time: None,
        };
        let result = self.admins.insert(&admin).await?;
        info!("Created admin {} for user {}", admin.id, admin.user_id);
        Ok(result)
    }

    /// Updates the admin's account fields, and its roles when given.
    pub async fn update(&self, form: &UpdateAdminForm, locale: Locale) -> Result<UpdateResult, ApiError> {
        form.validate(locale)?;
        let id = parse_id(&form.user.id)?;
        let admin = match self.admins.find_by_id(&id).await? {
            Some(admin) if !admin.is_deleted() => admin,
            _ => return Err(ApiError::not_found("Admin not found")),
        };

        let account = self
            .accounts
            .update_fields(
                &admin.user_id,
                &form.user.full_name,
                &form.user.address,
                &form.user.desc,
                &form.user.password,
            )
            .await?;

        match &form.roles {
            Some(roles) => {
                let roles = self.admins.update(&id, json!({ "roles": roles })).await?;
                Ok(UpdateResult {
                    matched_count: account.matched_count,
                    modified_count: account.modified_count.max(roles.modified_count),
                })
            }
            None => Ok(account),
        }
    }

    /// Soft-deletes the admin record; the user account is left alone.
    pub async fn delete(&self, raw_id: &str) -> Result<UpdateResult, ApiError> {
        let id = parse_id(raw_id)?;
        if self.admins.find_by_id(&id).await?.is_none() {
            return Err(ApiError::not_found("Admin not found"));
        }

        let result = self
            .admins
            .update(&id, json!({ "deleteTime": Utc::now().timestamp() }))
            .await?;
        info!("Soft-deleted admin {}", id);
        Ok(result)
    }

    async fn user_ids_matching(&self, keyword: &str) -> Result<Vec<String>, ApiError> {
        Ok(self
            .users
            .find_ids(Filter::matching(json!({ "email": keyword_condition(keyword) }))?)
            .await?)
    }

    async fn join_users(&self, admins: Vec<Admin>) -> Result<Vec<AdminView>, ApiError> {
        let mut ids: Vec<String> = admins.iter().map(|a| a.user_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let users: HashMap<String, UserView> = self
            .users
            .select_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), UserView::from(u)))
            .collect();

        Ok(admins
            .into_iter()
            .map(|admin| {
                let user = users.get(&admin.user_id).cloned();
                AdminView::new(admin, user)
            })
            .collect())
    }
}
