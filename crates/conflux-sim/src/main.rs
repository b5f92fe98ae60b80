#![doc = include_str!("../README.md")]

mod config;
mod scenarios;

use clap::Parser;
use config::CliArgs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,conflux=debug")),
        )
        .init();

    tracing::info!(
        workers = args.workers,
        jobs = args.jobs,
        "running worker pool scenario"
    );
    scenarios::run_dispatch(&args).await?;

    tracing::info!(
        producers = args.producers,
        items_per_producer = args.items_per_producer,
        "running stream merge scenario"
    );
    scenarios::run_merge(&args).await?;

    Ok(())
}
