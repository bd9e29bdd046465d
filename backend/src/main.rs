//! Backend entry-point: loads settings, opens storage, and serves HTTP.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use grouptrack::outbound::open_storage;
use grouptrack::settings::Settings;
use server::{ServerConfig, create_server};

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

    let settings = Settings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let backend = settings
        .storage_backend()
        .wrap_err("invalid storage settings")?;
    let config = ServerConfig::from_settings(&settings).wrap_err("invalid server settings")?;

    let ports = open_storage(&backend)
        .await
        .wrap_err("failed to open storage")?;

    let bind_addr = config.bind_addr();
    let server = create_server(&ports, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}
