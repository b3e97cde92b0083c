use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{password, AuthError};
use crate::database::models::{User, UserToken};
use crate::database::{DocumentStore, Repository};
use crate::filter::Filter;

/// Resolve a bearer credential to its live user.
///
/// Tokens never expire; a token is rejected only when it is unknown or its
/// owner is missing or soft-deleted.
pub async fn authenticate(store: &Arc<dyn DocumentStore>, token: &str) -> Result<User, AuthError> {
    let tokens = Repository::<UserToken>::new(store.clone());
    let Some(session) = tokens.find_by_id(token).await? else {
        return Err(AuthError::Unauthenticated);
    };

    let users = Repository::<User>::new(store.clone());
    match users.find_by_id(&session.user_id).await? {
        Some(user) if !user.is_deleted() => Ok(user),
        _ => Err(AuthError::Unauthenticated),
    }
}

/// Check an email/password pair. The email is matched case-insensitively.
pub async fn verify_credentials(
    store: &Arc<dyn DocumentStore>,
    email: &str,
    plain_password: &str,
) -> Result<User, AuthError> {
    let email = email.trim().to_lowercase();
    let users = Repository::<User>::new(store.clone());
    let user = users
        .select_one(Filter::matching(json!({ "email": email }))?)
        .await?;

    let user = match user {
        Some(user) if !user.is_deleted() => user,
        _ => {
            warn!("Login rejected: no active account for {}", email);
            return Err(AuthError::AccountNotFound);
        }
    };

    if !password::verify_password(plain_password.to_string(), user.password.clone()).await? {
        warn!("Login rejected: wrong password for {}", email);
        return Err(AuthError::WrongPassword);
    }

    Ok(user)
}

/// Mint and persist a new session token for the user.
pub async fn issue_token(
    store: &Arc<dyn DocumentStore>,
    user: &User,
    user_agent: &str,
) -> Result<UserToken, AuthError> {
    let token = UserToken {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        user_agent: user_agent.to_string(),
        create_time: Utc::now().timestamp(),
    };

    Repository::<UserToken>::new(store.clone()).insert(&token).await?;
    info!("Issued session for user {}", user.id);
    Ok(token)
}

/// Extract the credential from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
