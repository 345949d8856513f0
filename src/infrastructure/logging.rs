use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::LoggingConfig, infrastructure::directories::ResolvedPaths};

const LOG_FILE_PREFIX: &str = "claimcheck.log";
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "tower=warn", "axum::rejection=warn"];

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Console plus a daily-rolled file under the logs directory. `RUST_LOG`
/// overrides the configured level. Safe to call more than once.
pub fn init_tracing(config: &LoggingConfig, paths: &ResolvedPaths) -> Result<()> {
    if FILE_GUARD.get().is_some() {
        return Ok(());
    }

    let file_appender = tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let installed = tracing_subscriber::registry()
        .with(filter_for(&config.level))
        .with(fmt::layer().with_writer(io::stdout).with_target(true))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init();

    match installed {
        Ok(()) => {
            let _ = FILE_GUARD.set(guard);
            tracing::info!(
                target: "lifecycle",
                level = %config.level,
                logs = %paths.logs_dir.display(),
                "tracing initialized"
            );
        }
        Err(err) => {
            tracing::debug!(target: "lifecycle", error = %err, "global subscriber already set");
        }
    }
    Ok(())
}

fn filter_for(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = std::iter::once(level)
        .chain(QUIET_DEPENDENCIES.iter().copied())
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_keeps_dependencies_quiet() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let rendered = filter_for("debug").to_string();
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("hyper=warn"));
    }
}
