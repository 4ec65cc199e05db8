use std::path::PathBuf;

/// Runtime configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Directory holding the snapshot database |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | tracing max level |
/// | LOG_DIR | (unset) | Daily rolling log files when set |
/// | SALES_WEBHOOK_URL | (unset) | Sale notification endpoint |
/// | WEBHOOK_TIMEOUT_MS | (unset) | Webhook request timeout, none when unset |
/// | PERSIST | true | Keep store snapshots in WORK_DIR |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/studio SALES_WEBHOOK_URL=https://hooks.example/sales cargo test
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `studio.redb`
    pub work_dir: String,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Where sale notifications are POSTed
    pub sales_webhook_url: Option<String>,
    pub webhook_timeout_ms: Option<u64>,
    /// Open stores against the snapshot database instead of memory only
    pub persist: bool,
}

impl Config {
    /// Load `.env` (if any) then read the environment
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.is_empty()),
            sales_webhook_url: std::env::var("SALES_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            webhook_timeout_ms: std::env::var("WEBHOOK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            persist: std::env::var("PERSIST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Override the work dir and webhook URL
    ///
    /// Mostly used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, sales_webhook_url: Option<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.sales_webhook_url = sales_webhook_url;
        config
    }

    /// Path of the snapshot database
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("studio.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
