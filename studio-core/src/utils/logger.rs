//! Logging setup
//!
//! One global `tracing` subscriber, configured from [`Config`]:
//!
//! | Setting | Effect |
//! |---------|--------|
//! | `RUST_LOG` | full filter directive, wins over `LOG_LEVEL` |
//! | `LOG_LEVEL` | default filter when `RUST_LOG` is unset |
//! | `LOG_DIR` | daily rolling `studio.*` files instead of stdout |
//! | `ENVIRONMENT=production` | JSON lines |
//! | `ENVIRONMENT=development` | multi-line pretty output |

use crate::core::Config;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Rolling file name prefix under `LOG_DIR`
pub const LOG_FILE_PREFIX: &str = "studio";

/// Keeps the background file writer alive
///
/// Buffered lines are flushed when the guard drops.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LogGuard {
    file: Option<WorkerGuard>,
}

impl LogGuard {
    pub fn writes_to_file(&self) -> bool {
        self.file.is_some()
    }
}

/// Install the global subscriber
///
/// A second call keeps the subscriber already installed; the returned guard
/// still owns its own file writer.
pub fn init_logger(config: &Config) -> LogGuard {
    let (writer, file_guard) = log_writer(config.log_dir.as_deref());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level))
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.is_production() {
        builder.json().try_init()
    } else if config.is_development() {
        builder.pretty().try_init()
    } else {
        builder.compact().try_init()
    };
    if installed.is_ok() {
        tracing::debug!(
            environment = %config.environment,
            file = file_guard.is_some(),
            "Logger initialized"
        );
    }

    LogGuard { file: file_guard }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Writer for `log_dir`, stdout when unset or not creatable
fn log_writer(log_dir: Option<&str>) -> (BoxMakeWriter, Option<WorkerGuard>) {
    let Some(dir) = log_dir else {
        return (BoxMakeWriter::new(std::io::stdout), None);
    };
    if let Err(e) = std::fs::create_dir_all(Path::new(dir)) {
        eprintln!("Cannot create log directory {}: {}, logging to stdout", dir, e);
        return (BoxMakeWriter::new(std::io::stdout), None);
    }
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    (BoxMakeWriter::new(writer), Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_created_and_owns_a_guard() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("studio");
        let (_, guard) = log_writer(nested.to_str());
        assert!(guard.is_some());
        assert!(nested.is_dir());

        let (_, guard) = log_writer(None);
        assert!(guard.is_none());
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        // Only meaningful when RUST_LOG does not override
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter("studio_core=loud").to_string(), "info");
            assert_eq!(env_filter("debug").to_string(), "debug");
        }
    }

    #[test]
    fn init_twice_keeps_first_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), None);
        config.log_dir = Some(dir.path().join("logs").to_string_lossy().into_owned());

        let first = init_logger(&config);
        assert!(first.writes_to_file());
        config.log_dir = None;
        let second = init_logger(&config);
        assert!(!second.writes_to_file());
        tracing::info!("logger ready");
    }
}
