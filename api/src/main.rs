use anyhow::{Context, Result};
use api::{build_app, AppState};
use migration::{Migrator, MigratorTrait};
use shared::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    info!(
        "Starting {} v{} ({}) in {} mode",
        config.app_name,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        config.app_env
    );
    if config.uses_default_secret() {
        if config.is_production() {
            anyhow::bail!("SECRET_KEY must be set in production");
        }
        warn!("SECRET_KEY is not set; using the development default");
    }

    let state = AppState::new(config.clone()).await?;
    Migrator::up(state.db.as_ref(), None)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    let app = build_app(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
