use std::sync::Arc;

use clap::Parser;
use tenant_config_api::{
    api::start_api_server,
    cli::Cli,
    graphql::GraphqlClient,
    init_tracing,
    observability::log_config_info,
    storage::Repositories,
    Config, Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = cli.apply(Config::from_env()?)?;
    init_tracing(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting tenant configuration API");
    log_config_info(&config);

    let client = GraphqlClient::new(&config.graphql)?;
    let repositories = Repositories::graphql(Arc::new(client));

    start_api_server(config.api, repositories).await
}
