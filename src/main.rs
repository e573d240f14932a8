mod app;
mod deck_core;
mod model;
mod nav;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;
use model::AppConfig;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

/// File logging only; stdout belongs to the terminal UI.
fn init_logging(cfg: &AppConfig) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_env("REQDECK_LOG")
        .unwrap_or_else(|_| "reqdeck=info".into());
    let (dir, file) = match cfg.log_file.as_deref().map(PathBuf::from) {
        Some(p) => {
            let dir = p
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file = p.file_name()?.to_os_string();
            (dir, file)
        }
        None => (
            dirs::data_local_dir()?.join("reqdeck"),
            "reqdeck.log".into(),
        ),
    };
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: failed to create log directory {dir:?}: {err}");
        return None;
    }
    let file_appender = tracing_appender::rolling::never(dir, file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(env_filter);
    tracing_subscriber::registry().with(file_layer).init();
    Some(guard)
}

fn main() -> Result<()> {
    let cfg = ui::load_config()?;
    let _log_guard = init_logging(&cfg);
    tracing::info!(db = %cfg.db_path, "starting reqdeck");
    ui::run(cfg)
}
