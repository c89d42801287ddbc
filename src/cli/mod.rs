pub mod commands;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront API - backend for the Rent Easy and Chat Point storefronts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "YAML file overlaid on the APP_ENV profile (default: $APP_CONFIG_FILE)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create collections and indexes, then exit")]
    Migrate,

    #[command(about = "Check the /health endpoint of a running server")]
    Health {
        #[arg(long, default_value = "http://127.0.0.1:3000", help = "Base URL of the server")]
        url: String,
    },
}

/// `--config` wins over APP_CONFIG_FILE
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let file = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("APP_CONFIG_FILE").map(PathBuf::from));
    Ok(AppConfig::load(file.as_deref())?)
}

pub async fn run(command: Option<Commands>, config: AppConfig) -> anyhow::Result<()> {
    match command.unwrap_or_else(|| Commands::Serve(Default::default())) {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::Health { url } => commands::health::handle(&url).await,
    }
}
