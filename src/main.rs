use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repo_harvest::{
    config::Config, database::Database, github::GithubClient, pipeline::Pipeline,
};

#[derive(Parser)]
#[command(name = "repo-harvest")]
#[command(version = "0.1.0")]
#[command(about = "Harvests GitHub repository and contributor metadata into MySQL")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Repository search query (overrides config file)
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// GitHub API token (overrides config file and GITHUB_TOKEN)
    #[arg(short, long, value_name = "TOKEN")]
    token: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("repo_harvest={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting repo-harvest v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(query) = cli.query {
        config.harvest.query = query;
    }
    if let Some(token) = cli.token {
        config.github.token = Some(token);
    }

    let database = Database::new(&config.database).await?;
    info!(
        "Connected to database {} on {}:{}",
        config.database.database, config.database.host, config.database.port
    );

    let client = GithubClient::new(&config.github, &config.harvest);
    let pipeline = Pipeline::new(
        Arc::new(client),
        Arc::new(database),
        config.harvest.clone(),
    );

    let report = pipeline.run().await;
    if let Some(failure) = report.first_failure() {
        error!("Harvest failed: {failure}");
        std::process::exit(1);
    }

    Ok(())
}
