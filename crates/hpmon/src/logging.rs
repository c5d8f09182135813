//! Tracing subscriber setup.
//!
//! Stderr by default. With a log file, events are appended to that one file
//! through a non-blocking writer, with source file and line on every line.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Default filter for a `-v` count. Logging to a file starts at `info` so
/// every run leaves its start line and outcome behind.
fn default_level(verbosity: u8, to_file: bool) -> &'static str {
    match verbosity {
        0 if to_file => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered file lines are lost.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let level = default_level(verbosity, log_file.is_some());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(open_appender(path)?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
    Ok(Some(guard))
}

fn open_appender(path: &Path) -> Result<RollingFileAppender, CliError> {
    let log_file_err = |reason: String| CliError::LogFile {
        path: path.to_path_buf(),
        reason,
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| log_file_err("path does not name a file".into()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| log_file_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_level(0, false), "warn");
        assert_eq!(default_level(0, true), "info");
        assert_eq!(default_level(1, false), "info");
        assert_eq!(default_level(2, true), "debug");
        assert_eq!(default_level(5, false), "trace");
    }
}
