use anyhow::Context;
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info")?;
    let settings = Settings::load().context("Failed to load settings")?;
    let pool = db::establish_connection(&settings.database.path)
        .await
        .with_context(|| format!("Cannot open database {}", settings.database.path))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    let res = run_server(&settings, pool).await;
    if let Err(err) = &res {
        tracing::error!("Server exited: {err:#}");
    }
    res
}
