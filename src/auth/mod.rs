pub mod password;
pub mod session;

use thiserror::Error;

use crate::database::DatabaseError;
use crate::filter::FilterError;

pub use password::{hash_password, verify_password};
pub use session::{authenticate, bearer_token, issue_token, verify_credentials};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("account does not exist")]
    AccountNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<FilterError> for AuthError {
    fn from(err: FilterError) -> Self {
        AuthError::Store(err.into())
    }
}
