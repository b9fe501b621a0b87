//! Backend entry-point: loads settings, prepares the database, and serves the
//! assignment API until interrupted.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use planner::inbound::http::health::HealthState;
use planner::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

async fn apply_migrations(database_url: String) -> Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to apply database migrations")?;
    info!(applied, "database schema up to date");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load server settings")?;
    let database_url = settings.database_url()?.to_owned();
    if settings.run_migrations() {
        apply_migrations(database_url).await?;
    }
    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("failed to build database pool")?;

    let shutdown = CancellationToken::new();
    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_address();
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(bind_addr, pool, shutdown.clone()),
    )?;
    let handle = server.handle();

    tokio::spawn({
        let health_state = health_state.clone();
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                health_state.mark_unhealthy();
                shutdown.cancel();
                handle.stop(true).await;
            }
        }
    });

    health_state.mark_ready();
    info!(%bind_addr, "planner listening");
    server.await?;
    shutdown.cancel();
    Ok(())
}
