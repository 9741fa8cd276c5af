//! Rolling file logs for the notes core.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Repeating init with the same level and directory is a no-op.
//! - A second init with another level or directory is rejected.
//! - Init never panics.
//! - Events carry identifiers and counts only: titles, content and email
//!   addresses stay out of the log files.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "notehub";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("log directory must be a non-empty absolute path, got `{0}`")]
    InvalidDirectory(String),
    #[error("failed to create log directory `{path}`: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already active with level `{active_level}` at `{active_dir}`")]
    AlreadyConfigured {
        active_level: &'static str,
        active_dir: PathBuf,
    },
}

/// Starts file logging at `log_dir` with the given level.
///
/// Calling again with the same arguments succeeds without side effects.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let log_dir = check_log_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start_backend(level, &log_dir))?;
    if active.level != level || active.log_dir != log_dir {
        return Err(LoggingError::AlreadyConfigured {
            active_level: active.level,
            active_dir: active.log_dir.clone(),
        });
    }
    Ok(())
}

/// Starts file logging from the resolved configuration.
pub fn init_from_config(config: &CoreConfig) -> Result<(), LoggingError> {
    init_logging(&config.log_level, &config.log_dir)
}

/// Active `(level, log_dir)`, or `None` before the first successful init.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();

    info!(
        "event=core_init module=core status=ok platform={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        _ => Err(LoggingError::UnsupportedLevel(level.trim().to_string())),
    }
}

fn check_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if log_dir.as_os_str().is_empty() || !log_dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(
            log_dir.display().to_string(),
        ));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(panic_info);
    }));
}

// Panic payloads may quote user text.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut out: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{check_log_dir, init_logging, logging_status, parse_level, single_line, LoggingError};
    use std::path::Path;

    #[test]
    fn parse_level_normalizes_aliases() {
        assert_eq!(parse_level(" INFO ").expect("info"), "info");
        assert_eq!(parse_level("warning").expect("warning"), "warn");
        assert!(matches!(
            parse_level("loud"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = check_log_dir(Path::new("logs/dev")).expect_err("relative dir");
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        let out = single_line("line1\nline2\rline3", 8);
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_reconfiguration() {
        let dir = tempfile::tempdir().expect("temp dir");
        let other = tempfile::tempdir().expect("second temp dir");

        init_logging("info", dir.path()).expect("first init");
        init_logging("info", dir.path()).expect("repeat init");

        assert!(matches!(
            init_logging("debug", dir.path()),
            Err(LoggingError::AlreadyConfigured { .. })
        ));
        assert!(matches!(
            init_logging("info", other.path()),
            Err(LoggingError::AlreadyConfigured { .. })
        ));

        let (level, active_dir) = logging_status().expect("logging active");
        assert_eq!(level, "info");
        assert_eq!(active_dir, dir.path());
    }
}
