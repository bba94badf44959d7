//! Structured logging for blockvol tools.
//!
//! Library crates emit `tracing` events; binaries call [`init_logging`] once
//! at startup. Output goes to the console with uptime timestamps and module
//! paths, plus a JSON file for post-mortem analysis when file logging is on.
//! `RUST_LOG` always wins over the configured level.

use std::path::{Path, PathBuf};

use blockvol_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log inside the log directory.
pub const LOG_FILE_NAME: &str = "blockvol.log";

/// Initialize the global tracing subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for the JSON log file
/// * `file_logging` - Whether to write the JSON log at all
/// * `config` - Optional configuration supplying the log level
///
/// Returns `false` if a global subscriber was already installed, in which
/// case this call changes nothing.
///
/// # Examples
///
/// ```no_run
/// use blockvol_config::Config;
/// use blockvol_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, file_logging: bool, config: Option<&Config>) -> bool {
    let filter_str = filter_directive(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if file_logging
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        let installed = subscriber.with(file_layer).try_init().is_ok();
        if installed {
            tracing::info!(
                "Logging initialized (default filter: {}, JSON log: {})",
                filter_str,
                log_file_path(log_dir).display()
            );
        }
        return installed;
    }

    let installed = subscriber.try_init().is_ok();
    if installed {
        tracing::info!("Logging initialized (default filter: {})", filter_str);
    }
    installed
}

/// The filter directive derived from `config`, or [`DEFAULT_FILTER`].
pub fn filter_directive(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Location of the JSON log inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// An `EnvFilter` with the default directive.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        assert_eq!(filter_directive(None), "info");
        assert!(format!("{}", default_env_filter()).contains("info"));
    }

    #[test]
    fn test_config_level_is_used() {
        let mut config = Config::default();
        config.debug.log_level = "warn,blockvol_storage=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "warn,blockvol_storage=trace");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,blockvol_storage=trace",
            "warn,blockvol_storage::worker=debug",
            "error",
        ];

        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }

    #[test]
    fn test_init_logging_installs_once_and_writes_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let config = Config::default();

        assert!(init_logging(Some(&log_dir), true, Some(&config)));
        assert!(log_file_path(&log_dir).exists());

        // A second subscriber is refused without touching the first.
        assert!(!init_logging(None, false, None));
    }

    #[test]
    fn test_log_file_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = log_file_path(temp_dir.path());
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(path.parent(), Some(temp_dir.path()));
    }
}
