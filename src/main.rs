use clap::Parser;

use anyshare_admin_api::cli::{self, Cli};
use anyshare_admin_api::config::AppConfig;
use anyshare_admin_api::server;

#[tokio::main]
async fn main() {
    // Load .env if present so PORT and DATABASE_URL can live in a file during development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = if cli.serves_http() {
        AppConfig::from_env()
    } else {
        AppConfig::maintenance_from_env()
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    server::init_tracing(config.log_format);

    if let Err(e) = cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
