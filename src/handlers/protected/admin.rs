// handlers/protected/admin.rs - /admin CRUD handlers

use axum::extract::{Path, Query, State};

use crate::database::models::AdminView;
use crate::database::{InsertOneResult, UpdateResult};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::query::{ListParams, Page};
use crate::services::{AdminService, CreateAdminForm, UpdateAdminForm};
use crate::state::AppState;

fn service(state: &AppState) -> AdminService {
    AdminService::new(state.store().clone(), state.config().security.bcrypt_cost)
}

/// GET /admin?page&pageSize&keyword&status - Admins joined with their accounts.
/// The keyword searches the account email.
pub async fn admin_list(
    State(state): State<AppState>,
    locale: Locale,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<AdminView>> {
    let query = params.resolve(&state.config().list, locale)?;
    Ok(ApiResponse::success(service(&state).list(&query).await?))
}

/// GET /admin/:id
pub async fn admin_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AdminView> {
    Ok(ApiResponse::success(service(&state).get(&id).await?))
}

/// POST /admin - Creates the account and its admin record
pub async fn admin_post(
    State(state): State<AppState>,
    locale: Locale,
    JsonBody(form): JsonBody<CreateAdminForm>,
) -> ApiResult<InsertOneResult> {
    Ok(ApiResponse::success(service(&state).create(&form, locale).await?))
}

/// PUT /admin
pub async fn admin_put(
    State(state): State<AppState>,
    locale: Locale,
    JsonBody(form): JsonBody<UpdateAdminForm>,
) -> ApiResult<UpdateResult> {
    Ok(ApiResponse::success(service(&state).update(&form, locale).await?))
}

/// DELETE /admin/:id - Soft delete of the admin record only
pub async fn admin_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UpdateResult> {
    Ok(ApiResponse::success(service(&state).delete(&id).await?))
}
