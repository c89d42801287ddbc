use clap::Parser;
use storefront_api::cli::{self, Cli};
use storefront_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_FLAVOR, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    init_tracing(&config);

    if let Err(e) = cli::run(cli.command, config).await {
        exit_with(e);
    }
}

fn init_tracing(config: &AppConfig) {
    let default = if config.api.enable_request_logging {
        "info,tower_http=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn exit_with(e: anyhow::Error) -> ! {
    match std::env::var("CLI_VERBOSE").as_deref() {
        Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
        _ => eprintln!("Error: {e}"),
    }
    std::process::exit(1);
}
