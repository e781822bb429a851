//! Logging setup: human-readable console output plus a rotating log file.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Prefix of every log file written by this crate
const LOG_FILE_PREFIX: &str = "orderflow";

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory to store log files
    pub log_dir: String,
    /// Log level filter (e.g. "info", "orderflow=debug"); RUST_LOG takes precedence
    pub level_filter: String,
    pub rotation: LogRotation,
    /// Whether to include timestamps in console output
    pub console_timestamps: bool,
    /// Whether to write the file log as JSON lines
    pub file_json_format: bool,
}

#[derive(Debug, Clone)]
pub enum LogRotation {
    Daily,
    Hourly,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            level_filter: "info,orderflow=info".to_string(),
            rotation: LogRotation::Daily,
            console_timestamps: true,
            file_json_format: true,
        }
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level_filter))
}

/// Initialize console + rotating file logging.
///
/// Console output goes to stderr so annotated data on stdout stays clean. The
/// returned guard must be held for the life of the process, otherwise buffered
/// file output is lost.
pub fn init_dual_logging(config: &LoggingConfig) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_name = format!("{}.log", LOG_FILE_PREFIX);
    let file_appender = match config.rotation {
        LogRotation::Daily => tracing_appender::rolling::daily(&config.log_dir, &file_name),
        LogRotation::Hourly => tracing_appender::rolling::hourly(&config.log_dir, &file_name),
    };
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_timer = if config.console_timestamps {
        ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f UTC".to_string())
    } else {
        ChronoUtc::new(String::new())
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_timer(console_timer)
        .with_filter(env_filter(config));

    let file_layer = if config.file_json_format {
        fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string()))
            .with_filter(env_filter(config))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f UTC".to_string()))
            .with_filter(env_filter(config))
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        log_dir = %config.log_dir,
        rotation = ?config.rotation,
        json_format = config.file_json_format,
        "Logging initialized: console + rotating file"
    );

    Ok(guard)
}

/// Console-only logging for tests or minimal setups
pub fn init_simple_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,orderflow=info")))
        .with_writer(std::io::stderr)
        .try_init()?;
    Ok(())
}

/// Log files written by this crate in `log_dir`, sorted by name
pub fn get_current_log_files(log_dir: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(log_dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file()
                        && path
                            .file_name()
                            .and_then(|name| name.to_str())
                            .map(|name| name.starts_with(LOG_FILE_PREFIX) && name.contains(".log"))
                            .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default();

    files.sort();
    files
}

/// Log build and worker pool information
pub fn log_system_info() {
    tracing::info!(
        package_version = env!("CARGO_PKG_VERSION"),
        target_os = std::env::consts::OS,
        rayon_threads = rayon::current_num_threads(),
        "Environment information"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.level_filter, "info,orderflow=info");
        assert!(matches!(config.rotation, LogRotation::Daily));
        assert!(config.file_json_format);
    }

    #[test]
    fn test_get_current_log_files() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path();

        std::fs::write(log_dir.join("orderflow.log.2025-01-02"), "b").unwrap();
        std::fs::write(log_dir.join("orderflow.log.2025-01-01"), "a").unwrap();
        std::fs::write(log_dir.join("other.log"), "x").unwrap();
        std::fs::write(log_dir.join("orderflow.txt"), "x").unwrap();

        let files = get_current_log_files(log_dir.to_str().unwrap());
        assert_eq!(files.len(), 2);
        assert!(files[0].to_str().unwrap().ends_with("2025-01-01"));
        assert!(files[1].to_str().unwrap().ends_with("2025-01-02"));
    }

    #[test]
    fn test_missing_log_dir() {
        assert!(get_current_log_files("/nonexistent/orderflow-logs").is_empty());
    }
}
