//! Tracing setup for the CLI.
//!
//! Everything goes to a timestamped file under the platform state dir;
//! stderr only sees warnings so it never interleaves with streamed
//! Markdown on stdout. `CASCADE_LOG` takes the usual env-filter syntax.

use crate::config::APP_STRATEGY;
use anyhow::{Context, Result};
use etcetera::{choose_app_strategy, AppStrategy};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

fn log_dir() -> Result<PathBuf> {
    let strategy = choose_app_strategy(APP_STRATEGY.clone())
        .context("failed to determine platform directories")?;
    let dir = strategy
        .state_dir()
        .unwrap_or_else(|| strategy.data_dir())
        .join("logs")
        .join("cli");
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Install the global subscriber. The returned guard must live as long
/// as the process so the non-blocking writer can flush on exit.
pub fn setup_logging() -> Result<WorkerGuard> {
    let file = std::fs::File::create(
        log_dir()?.join(format!("{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"))),
    )
    .context("failed to create log file")?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_env("CASCADE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("cascade=info,cascade_cli=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_filter(LevelFilter::WARN),
        )
        .init();

    Ok(guard)
}
