mod cli;
mod config;
mod consts;
mod database;
mod errors;
mod server;
mod store_impl;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use cli::args::Args;
use errors::{CollateServerError, init_error};
use log::info;
use server::create_server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), CollateServerError> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME"),
                    args.verbose.log_level_filter()
                )
                .to_lowercase()
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialise tracing")
        .map_err(init_error)?;

    info!(
        "Starting collate server version {}",
        env!("CARGO_PKG_VERSION")
    );

    create_server(args.config_path.as_deref())
        .await
        .context("Failed to start server")
        .map_err(init_error)
}
