use tracing::warn;

use super::AuthError;

/// Hashes on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_password(plain: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Constant-time check of a plaintext against a stored hash.
///
/// A stored value that is not a valid bcrypt hash never verifies.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, AuthError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!("Stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}
