mod auth;
mod changelog;
mod classify;
mod cli;
mod config;
mod error;
mod git;
mod render;
mod tracker;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting relog - release changelog generator");
    cli.execute().await?;

    Ok(())
}
