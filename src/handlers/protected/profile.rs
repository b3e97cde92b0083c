// handlers/protected/profile.rs - /profile handlers for the calling user

use axum::extract::State;

use crate::database::models::UserView;
use crate::database::UpdateResult;
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, JsonBody};
use crate::services::{ChangePasswordForm, ProfileService, UpdateProfileForm};
use crate::state::AppState;

fn service(state: &AppState) -> ProfileService {
    ProfileService::new(state.store().clone(), state.config().security.bcrypt_cost)
}

/// GET /profile - The authenticated user
pub async fn profile_get(CurrentUser(user): CurrentUser) -> ApiResult<UserView> {
    Ok(ApiResponse::success(user.into()))
}

/// POST /profile - Update fullName, address and desc of the caller. Email is ignored.
pub async fn profile_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    locale: Locale,
    JsonBody(form): JsonBody<UpdateProfileForm>,
) -> ApiResult<UpdateResult> {
    let result = service(&state).update(&user.id, &form, locale).await?;
    Ok(ApiResponse::success(result))
}

/// POST /profile/password - Change the caller's password
pub async fn password_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    locale: Locale,
    JsonBody(form): JsonBody<ChangePasswordForm>,
) -> ApiResult<UpdateResult> {
    let result = service(&state).change_password(&user.id, &form, locale).await?;
    Ok(ApiResponse::success(result))
}
