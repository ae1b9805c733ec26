use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use trivia_api::config::get_configuration;
use trivia_api::db::{self, PgStore};
use trivia_api::server::app::run_server;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Settings file layered under the DB_* and APP_* environment variables
    #[clap(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = get_configuration(cli.config.as_deref()).context("Failed to read settings")?;

    let pool = db::establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(&settings.application, Arc::new(PgStore::new(pool))).await
}
