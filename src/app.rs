use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::{
    config::AppConfig,
    http::{build_router, AppState},
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    serving::ServingState,
    store::ArtifactStore,
    tasks::TrainingCoordinator,
};

pub struct ClaimCheckApp {
    state: Arc<AppState>,
    bind_addr: SocketAddr,
    shutdown: Shutdown,
}

impl ClaimCheckApp {
    pub fn initialize(config: AppConfig, paths: ResolvedPaths, shutdown: Shutdown) -> Result<Self> {
        let store = ArtifactStore::new(paths.artifact_dir);
        let serving = Arc::new(ServingState::load(store));
        let trainer = Arc::new(TrainingCoordinator::new(config.training, serving.clone()));
        let state = Arc::new(AppState::new(serving, trainer));

        Ok(Self {
            state,
            bind_addr: config.server.bind_addr,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let ClaimCheckApp {
            state,
            bind_addr,
            shutdown,
        } = self;

        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;
        tracing::info!(
            target: "lifecycle",
            %bind_addr,
            ready = state.serving.snapshot().is_ready(),
            "claim classifier listening"
        );

        let mut shutdown_listener = shutdown.subscribe();
        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(async move {
                let reason = shutdown_listener.stopped().await;
                tracing::info!(target: "lifecycle", ?reason, "draining http connections");
            })
            .await
            .context("http server terminated with an error")?;

        tracing::info!(target: "lifecycle", "server stopped");
        Ok(())
    }
}
