use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{self, AuthError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, resolved once per request by [`session_auth_middleware`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Bearer session middleware for the protected route group
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = auth::bearer_token(request.headers()).map(str::to_string) else {
        return ApiError::from(AuthError::Unauthenticated).into_response();
    };

    match auth::authenticate(state.store(), &token).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("Invalid or missing session token"))
    }
}
