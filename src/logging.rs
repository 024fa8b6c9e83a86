//! Log file setup.
//!
//! Every line goes to an append-only file as `timestamp LEVEL message`.
//! `log` macros used throughout the crate are bridged into the same
//! subscriber.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Keeps the background log writer alive; dropping it flushes pending lines.
pub struct Logging {
    path: PathBuf,
    _file_guard: WorkerGuard,
}

impl Logging {
    /// Installs the global subscriber writing to `path`, creating the file
    /// and its parent directory if needed. Existing contents are kept.
    pub fn init(path: &Path) -> Result<Self> {
        let (writer, file_guard) = file_writer(path)?;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let file_layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init()
            .context("Failed to install the log subscriber")?;

        Ok(Self {
            path: path.to_path_buf(),
            _file_guard: file_guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {:?} has no file name", path))?;

    std::fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create log directory {:?}", directory))?;

    // Without rotation the file name is the prefix itself, opened for append
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(&directory)
        .with_context(|| format!("Failed to open log file {:?}", path))?;
    Ok(tracing_appender::non_blocking(appender))
}
