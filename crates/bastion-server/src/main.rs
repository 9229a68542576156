//! Bastion Server: Application entry point.

mod config;

use std::sync::Arc;

use anyhow::Context;
use bastion_auth::{Argon2PasswordHasher, Bootstrapper, PasswordHasher};
use bastion_core::clock::{Clock, SystemClock};
use bastion_db::MemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bastion=info".parse()?))
        .json()
        .init();

    info!("Starting Bastion server...");

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let hasher: Arc<dyn PasswordHasher> =
        Arc::new(Argon2PasswordHasher::new(config.auth.pepper.clone()));
    let store = MemoryStore::with_clock(clock.clone());

    Bootstrapper::new(
        store,
        hasher,
        clock,
        config.system_organization,
        config.system_user,
    )
    .setup()
    .await
    .context("system bootstrap failed")?;

    info!("Bastion server ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Bastion server stopped.");
    Ok(())
}
