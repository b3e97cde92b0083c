use serde::{Deserialize, Serialize};

use crate::database::models::user::UserView;
use crate::database::repository::Model;
use crate::database::store::Collection;

/// Role association between a user account and the admin console
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub join_time: i64,
    #[serde(default)]
    pub delete_time: Option<i64>,
}

impl Model for Admin {
    const COLLECTION: Collection = Collection::Admins;
}

impl Admin {
    pub fn is_deleted(&self) -> bool {
        self.delete_time.map_or(false, |t| t > 0)
    }
}

/// Admin joined with its user account. `user` is null when the account is gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: String,
    pub user: Option<UserView>,
    pub roles: Vec<String>,
    pub join_time: i64,
    pub delete_time: Option<i64>,
}

impl AdminView {
    pub fn new(admin: Admin, user: Option<UserView>) -> Self {
        Self {
            id: admin.id,
            user,
            roles: admin.roles,
            join_time: admin.join_time,
            delete_time: admin.delete_time,
        }
    }
}
