use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use untitled_folder::AppConfig;

/// Console logging on stderr, plus a file when `log_file` is configured.
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init_logger(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file_target(config.log_file.as_deref()) {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .without_time(),
        )
        .with(file_layer)
        .init();

    debug!(
        "Logging at '{}'{}",
        config.log_level,
        config
            .log_file
            .as_deref()
            .map(|f| format!(", also to {}", f))
            .unwrap_or_default()
    );
    guard
}

/// Splits a configured log path into the directory and file name the
/// appender wants. A bare file name lands in the working directory.
fn log_file_target(path: Option<&str>) -> Option<(PathBuf, OsString)> {
    let path = Path::new(path?);
    let name = path.file_name()?.to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, name))
}
