mod cli;
mod commands;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use gramprobe_core::config::AppConfig;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let config: AppConfig = toml::from_str(&config_str)?;

    match cli.command {
        Commands::Serve { bind } => server::run(config, bind).await,
        Commands::Scrape {
            profile,
            username,
            password,
        } => commands::scrape::run(config, profile, username, password).await,
        Commands::Screenshot {
            url,
            output,
            full_page,
        } => commands::render::screenshot(config, url, output, full_page).await,
        Commands::Pdf { url, output } => commands::render::pdf(config, url, output).await,
        Commands::Content { url } => commands::render::content(config, url).await,
    }
}
