use anyhow::Result;
use clap::Parser;

use claimcheck::{
    cli::Cli,
    config,
    infrastructure::{directories, logging},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging, &paths)?;

    cli.run(config, paths).await
}
