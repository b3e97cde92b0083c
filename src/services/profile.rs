use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth;
use crate::database::models::User;
use crate::database::{DocumentStore, Repository, UpdateResult};
use crate::error::ApiError;
use crate::i18n::{Locale, Message};
use crate::services::users::profile_rules;
use crate::validation::{Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileForm {
    /// Accepted for form compatibility; the email cannot be changed here.
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub desc: String,
}

impl Validate for UpdateProfileForm {
    fn rules(&self, v: &mut Validator) {
        profile_rules(v, &self.full_name, &self.address, &self.desc);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub re_password: String,
}

impl Validate for ChangePasswordForm {
    fn rules(&self, v: &mut Validator) {
        v.required("oldPassword", &self.old_password);
        v.required("newPassword", &self.new_password)
            .min_len("newPassword", &self.new_password, 7)
            .max_len("newPassword", &self.new_password, 50);
        v.required("rePassword", &self.re_password);
    }
}

/// Self-service operations on the caller's own account
pub struct ProfileService {
    users: Repository<User>,
    bcrypt_cost: u32,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, bcrypt_cost: u32) -> Self {
        Self {
            users: Repository::new(store),
            bcrypt_cost,
        }
    }

    pub async fn update(&self, user_id: &str, form: &UpdateProfileForm, locale: Locale) -> Result<UpdateResult, ApiError> {
        form.validate(locale)?;
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ApiError::field("email", Message::AccountNotExist, locale));
        }

        let set = json!({
            "fullName": form.full_name,
            "address": form.address,
            "desc": form.desc,
        });
        Ok(self.users.update(user_id, set).await?)
    }

    /// Old password is checked before the confirmation match.
    pub async fn change_password(
        &self,
        user_id: &str,
        form: &ChangePasswordForm,
        locale: Locale,
    ) -> Result<UpdateResult, ApiError> {
        form.validate(locale)?;
        let wrong_password = || ApiError::field("oldPassword", Message::WrongPassword, locale);

        let user = self.users.find_by_id(user_id).await?.ok_or_else(wrong_password)?;
        if !auth::verify_password(form.old_password.clone(), user.password).await? {
            return Err(wrong_password());
        }
        if form.new_password != form.re_password {
            return Err(ApiError::field("rePassword", Message::PasswordNotMatch, locale));
        }

        let hash = auth::hash_password(form.new_password.clone(), self.bcrypt_cost).await?;
        let result = self.users.update(user_id, json!({ "password": hash })).await?;
        info!("Password changed for user {}", user_id);
        Ok(result)
    }
}
