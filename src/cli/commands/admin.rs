use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::{DocumentStore, PgStore};
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::services::{AdminService, CreateAdminForm, CreateUserForm};

#[derive(Args, Debug, Clone)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Login email")]
    pub email: String,

    #[arg(long, env = "ADMIN_PASSWORD", help = "Initial password (7-50 characters)")]
    pub password: String,

    #[arg(long, help = "Display name")]
    pub full_name: String,

    #[arg(long, default_value = "-", help = "Postal address")]
    pub address: String,

    #[arg(long = "role", help = "Role label, repeatable")]
    pub roles: Vec<String>,
}

impl From<CreateAdminArgs> for CreateAdminForm {
    fn from(args: CreateAdminArgs) -> Self {
        Self {
            user: CreateUserForm {
                email: args.email,
                password: args.password,
                full_name: args.full_name,
                address: args.address,
                desc: String::new(),
            },
            roles: Some(args.roles),
        }
    }
}

pub async fn handle(args: CreateAdminArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(
        PgStore::connect(&config.database)
            .await
            .context("failed to connect to the database")?,
    );

    let service = AdminService::new(store.clone(), config.security.bcrypt_cost);
    let outcome = service.create(&CreateAdminForm::from(args), Locale::En).await;
    store.close().await;

    match outcome {
        Ok(result) => utils::output_success(
            output_format,
            &format!("Created admin {}", result.inserted_id),
            Some(json!({ "insertedId": result.inserted_id })),
        ),
        Err(ApiError::ValidationFailed(fields)) => {
            anyhow::bail!("invalid admin details:\n{}", utils::format_field_errors(&json!(fields)))
        }
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
