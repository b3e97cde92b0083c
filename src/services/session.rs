use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth;
use crate::database::models::UserView;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::validation::{Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn rules(&self, v: &mut Validator) {
        v.required("email", &self.email).email("email", &self.email);
        v.required("password", &self.password);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// Check credentials and open a new session.
pub async fn login(
    store: &Arc<dyn DocumentStore>,
    form: &LoginForm,
    user_agent: &str,
    locale: Locale,
) -> Result<LoginResponse, ApiError> {
    form.validate(locale)?;

    let user = auth::verify_credentials(store, &form.email, &form.password)
        .await
        .map_err(|e| ApiError::from_auth(e, locale))?;
    let token = auth::issue_token(store, &user, user_agent).await?;

    info!("User {} logged in", user.id);
    Ok(LoginResponse {
        token: token.id,
        user: user.into(),
    })
}
