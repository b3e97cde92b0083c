// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::i18n::{Locale, Message};
use crate::validation::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    MalformedRequest(String),

    // 401 Unauthorized
    #[error("{0}")]
    Unauthenticated(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 422 Unprocessable Entity (structural validation and business rules)
    #[error("validation failed")]
    ValidationFailed(FieldErrors),

    // 500 Internal Server Error
    #[error("{0}")]
    InternalFailure(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest(_) => "MALFORMED_REQUEST",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApiError::InternalFailure(_) => "INTERNAL_FAILURE",
        }
    }

    /// Convert to JSON response body.
    ///
    /// Validation failures render as the bare field-keyed map so clients can
    /// bind messages straight onto form inputs.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationFailed(fields) => json!(fields),
            _ => json!({
                "error": true,
                "message": self.to_string(),
                "code": self.error_code()
            }),
        }
    }
}

impl ApiError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ApiError::MalformedRequest(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalFailure(message.into())
    }

    /// Single-field business rule failure, localized
    pub fn field(field: &str, message: Message, locale: Locale) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), locale.translate(message, &[]));
        ApiError::ValidationFailed(fields)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        // Don't expose store internals to clients
        tracing::error!("Store error: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        DatabaseError::from(err).into()
    }
}

impl ApiError {
    /// Credential failures become localized field errors on the login form.
    pub fn from_auth(err: AuthError, locale: Locale) -> Self {
        match err {
            AuthError::AccountNotFound => ApiError::field("email", Message::AccountNotExist, locale),
            AuthError::WrongPassword => ApiError::field("password", Message::WrongPassword, locale),
            other => other.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ApiError::unauthenticated("Invalid or missing session token"),
            AuthError::AccountNotFound | AuthError::WrongPassword => ApiError::from_auth(err, Locale::default()),
            AuthError::Store(e) => e.into(),
            AuthError::Hashing(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
