use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::types::{ActionKind, Selector};

/// Console at INFO (or `RUST_LOG`), plus a DEBUG detail file
/// `automation_YYYYMMDD.log` under `log_dir`. Returns the file path.
pub fn init(log_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!("automation_{}.log", Local::now().format("%Y%m%d")));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(false).with_filter(console_filter);
    let detail = fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console)
        .with(detail)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(path)
}

pub fn log_step(step: &str, details: &str) {
    if details.is_empty() {
        info!("STEP: {step}");
    } else {
        info!("STEP: {step} - {details}");
    }
}

pub fn log_action(kind: ActionKind, selector: &Selector, success: bool) {
    if success {
        info!("[{kind}] {selector} - SUCCESS");
    } else {
        error!("[{kind}] {selector} - FAILED");
    }
}
