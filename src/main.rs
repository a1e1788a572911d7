//! # Registrar API Main Entry Point

use migration::MigratorTrait;
use registrar::{config::ConfigLoader, db, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new().load()?;

    telemetry::init_tracing(&config);
    tracing::info!(profile = %config.profile, "loaded configuration");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "effective configuration");
    }

    let db = db::init_pool(&config).await?;
    migration::Migrator::up(&db, None).await?;

    server::run_server(config, db).await
}
