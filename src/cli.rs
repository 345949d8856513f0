use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{
    app::ClaimCheckApp,
    config::AppConfig,
    infrastructure::{
        directories::ResolvedPaths,
        shutdown::{install_signal_handlers, Shutdown},
    },
    store::ArtifactStore,
    tasks::train_and_persist,
};

#[derive(Parser, Debug)]
#[command(
    name = "claimcheck",
    version,
    about = "Classify short claims as FAKE or REAL with a bag-of-words model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve predictions over HTTP (default)
    Serve,
    /// Fit the vectorizer and classifier on the configured dataset and save them
    Train,
}

impl Cli {
    pub async fn run(self, config: AppConfig, paths: ResolvedPaths) -> Result<()> {
        match self.command.unwrap_or(Command::Serve) {
            Command::Serve => serve(config, paths).await,
            Command::Train => train(config, paths).await,
        }
    }
}

async fn serve(config: AppConfig, paths: ResolvedPaths) -> Result<()> {
    let shutdown = Shutdown::new();
    install_signal_handlers(&shutdown);
    let app = ClaimCheckApp::initialize(config, paths, shutdown)?;
    app.run().await
}

async fn train(config: AppConfig, paths: ResolvedPaths) -> Result<()> {
    let store = ArtifactStore::new(paths.artifact_dir);
    let training = config.training;
    let report = tokio::task::spawn_blocking(move || train_and_persist(&training, &store))
        .await
        .context("training task panicked")??;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
