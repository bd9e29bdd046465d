//! Operator tool for provisioning accounts and inspecting group activity.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;

use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

use grouptrack::admin::{AdminCli, execute};
use grouptrack::outbound::open_storage;
use grouptrack::settings::Settings;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = AdminCli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(cli))
}

async fn async_main(cli: AdminCli) -> Result<()> {
    // Flags belong to the subcommand; storage comes from the environment
    // and config file only.
    let settings = Settings::load_from_iter([OsString::from("grouptrack-admin")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let backend = settings
        .storage_backend()
        .wrap_err("invalid storage settings")?;
    let ports = open_storage(&backend)
        .await
        .wrap_err("failed to open storage")?;

    let mut stdout = io::stdout().lock();
    execute(&cli.command, &ports, Utc::now(), &mut stdout).await?;
    Ok(())
}
