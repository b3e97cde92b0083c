use serde::{Deserialize, Serialize};

use crate::database::repository::Model;
use crate::database::store::Collection;

/// Stored account record. `password` holds the bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub desc: String,
    pub join_time: i64,
    #[serde(default)]
    pub delete_time: Option<i64>,
}

impl Model for User {
    const COLLECTION: Collection = Collection::Users;
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.delete_time.map_or(false, |t| t > 0)
    }
}

/// User as returned by the API, without the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub desc: String,
    pub join_time: i64,
    pub delete_time: Option<i64>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            address: user.address,
            desc: user.desc,
            join_time: user.join_time,
            delete_time: user.delete_time,
        }
    }
}
