use serde::{Deserialize, Serialize};

use crate::database::repository::Model;
use crate::database::store::Collection;

/// Session record. The `_id` is the bearer credential itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserToken {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_agent: String,
    pub create_time: i64,
}

impl Model for UserToken {
    const COLLECTION: Collection = Collection::UserTokens;
}
