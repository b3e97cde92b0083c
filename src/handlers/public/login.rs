// handlers/public/login.rs - POST /login handler

use axum::{extract::State, http::header::USER_AGENT, http::HeaderMap};

use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::{self, LoginForm, LoginResponse};
use crate::state::AppState;

/// POST /login - Exchange email and password for a bearer token
///
/// Expected Input:
/// ```json
/// { "email": "admin@anyshare.vn", "password": "secret123" }
/// ```
///
/// Expected Output:
/// ```json
/// { "token": "2b1c...", "user": { "id": "...", "email": "admin@anyshare.vn", ... } }
/// ```
///
/// Unknown or deleted accounts fail on `email`, bad passwords on `password` (422).
pub async fn login_post(
    State(state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    JsonBody(form): JsonBody<LoginForm>,
) -> ApiResult<LoginResponse> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let response = services::login(state.store(), &form, user_agent, locale).await?;
    Ok(ApiResponse::success(response))
}
