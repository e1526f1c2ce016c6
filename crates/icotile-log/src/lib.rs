//! Structured logging for the icosphere tile pipeline.
//!
//! Console output goes through a `tracing` fmt layer with uptime timestamps.
//! When file logging is enabled a second layer writes JSON lines to
//! `icotile.log`. `log` records from dependencies are forwarded into the same
//! subscriber.

use std::fs::File;
use std::path::{Path, PathBuf};

use icotile_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when neither `RUST_LOG` nor the config set a level.
pub const DEFAULT_DIRECTIVES: &str = "info,icotile_sphere=warn";

/// File name of the JSON log inside the log directory.
pub const LOG_FILE_NAME: &str = "icotile.log";

/// Filter directives for the given config, before `RUST_LOG` is considered.
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Filter with the default directives.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES)
}

/// Create the log directory and open a fresh JSON log file inside it.
pub fn open_log_file(log_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the config's `debug.log_level`. With `file_logging`
/// set and a `log_dir` given, JSON output is also written to
/// `log_dir/icotile.log`; failure to open that file is reported on the
/// console and logging continues without it.
///
/// Calling this twice in one process panics, as `tracing` allows only one
/// global default.
///
/// ```no_run
/// use icotile_config::Config;
/// use icotile_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, file_logging: bool, config: Option<&Config>) {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let mut file_error = None;
    if file_logging && let Some(log_dir) = log_dir {
        match open_log_file(log_dir) {
            Ok((path, log_file)) => {
                let file_layer = fmt::layer()
                    .with_writer(log_file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::uptime())
                    .json();
                subscriber.with(file_layer).init();
                tracing::info!(path = %path.display(), "JSON file logging enabled");
                return;
            }
            Err(e) => file_error = Some((log_dir.to_path_buf(), e)),
        }
    }

    subscriber.init();
    if let Some((dir, e)) = file_error {
        tracing::warn!(dir = %dir.display(), error = %e, "could not open log file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_contains_directives() {
        let filter_str = default_env_filter().to_string();
        assert!(filter_str.contains("info"));
        assert!(filter_str.contains("icotile_sphere=warn"));
    }

    #[test]
    fn test_directives_without_config() {
        assert_eq!(filter_directives(None), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn test_directives_from_config() {
        let mut config = Config::default();
        config.debug.log_level = " debug,icotile_lod=trace ".to_string();
        assert_eq!(filter_directives(Some(&config)), "debug,icotile_lod=trace");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for directives in [
            "info",
            "debug,icotile_mesh=trace",
            "warn,icotile_lod=debug,icotile_sphere=trace",
            DEFAULT_DIRECTIVES,
        ] {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "failed to parse filter: {directives}"
            );
        }
    }

    #[test]
    fn test_open_log_file_creates_nested_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs").join("run");
        let (path, _file) = open_log_file(&log_dir).unwrap();
        assert_eq!(path, log_dir.join(LOG_FILE_NAME));
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_truncates() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(LOG_FILE_NAME), "stale").unwrap();
        let (path, _file) = open_log_file(temp_dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
    }
}
