//! File logging for the dashboard.
//!
//! The terminal is owned by the TUI, so log output only ever goes to a file:
//! `~/.cache/salesdash/salesdash.log` (or platform equivalent) unless
//! `--log-file` names another path. `SALESDASH_LOG` overrides the filter.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "SALESDASH_LOG";

pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

const LOG_FILE_NAME: &str = "salesdash.log";

/// Default log file location under the user cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(crate::APP_NAME).join(LOG_FILE_NAME))
}

/// Filter from `SALESDASH_LOG` if set and valid, else `directive`, else info.
pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(directive.unwrap_or(DEFAULT_LOG_DIRECTIVE)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Install the global subscriber writing to `log_file` (or the default path).
///
/// Returns the guard that flushes buffered lines on drop; hold it for the
/// lifetime of the program. Returns `None` when no log file can be opened,
/// in which case logging stays disabled.
pub fn init(log_file: Option<&Path>, directive: Option<&str>) -> Option<WorkerGuard> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_log_path()?,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name()?.to_owned();

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!(
            "Failed to create log directory {}: {}; logging disabled",
            dir.display(),
            e
        );
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return None;
    }

    tracing::info!(log_file = %path.display(), "logging initialized");
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_app_log() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("salesdash/salesdash.log"));
        }
    }

    #[test]
    fn directive_used_without_env_override() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(env_filter(Some("debug")).to_string(), "debug");
        assert_eq!(env_filter(None).to_string(), "info");
    }
}
