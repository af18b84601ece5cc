use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV_VAR: &str = "YST_INSTALLER_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Console,
    File,
}

/// Level used when `YST_INSTALLER_LOG` is unset. The console stays silent by default since
/// the status macros already cover everything a user needs to see.
fn default_level(sink: Sink, verbose: bool) -> &'static str {
    match (sink, verbose) {
        (_, true) => "debug",
        (Sink::Console, false) => "off",
        (Sink::File, false) => "info",
    }
}

fn filter_for(sink: Sink, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level(sink, verbose)))
}

/// Diagnostics go to stderr (only with `--verbose` or `YST_INSTALLER_LOG`) and, with
/// `log_file`, to that file. The returned guard must be dropped before the process exits,
/// otherwise buffered file lines are lost.
pub fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(filter_for(Sink::Console, verbose));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_level(true)
                .with_writer(writer)
                .with_filter(filter_for(Sink::File, verbose));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if let Some(path) = log_file {
        tracing::debug!("Logging initialized. Writing to {}", path.display());
    }

    Ok(guard)
}
