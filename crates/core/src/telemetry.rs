//! Tracing subscriber setup shared by the binaries.
//!
//! Logs always go to stderr (stdout belongs to the CLI prompts and is
//! never written by the subscriber). An optional log file receives the
//! same events without ANSI colors.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Stderr output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event (server).
    Json,
    /// Compact human-readable lines (CLI).
    Compact,
}

/// Install the global subscriber.
///
/// `default_directive` applies when `RUST_LOG` is unset. The returned guard
/// must be kept alive for the file writer to flush.
pub fn init(format: LogFormat, default_directive: &str, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let json = (format == LogFormat::Json).then(|| fmt::layer().json().with_writer(std::io::stderr));
    let compact = (format == LogFormat::Compact).then(|| fmt::layer().compact().with_writer(std::io::stderr));

    let (file, guard) = match log_file.and_then(file_writer) {
        Some((writer, guard)) => (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard)),
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .with(file)
        .try_init()
    {
        eprintln!("logging already initialized: {e}");
    }

    guard
}

fn file_writer(path: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?;
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));

    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
