//! Process entry point

use super::Config;
use crate::dashboard::Dashboard;
use crate::utils::logger::{LogGuard, init_logger};
use shared::AppResult;

/// A running dashboard plus the logger that outlives it
#[derive(Debug)]
pub struct Studio {
    dashboard: Dashboard,
    log: LogGuard,
}

impl Studio {
    /// Read `.env` and the environment, then [`Studio::start`]
    pub fn from_env() -> AppResult<Self> {
        Self::start(&Config::load())
    }

    /// Install logging and open the dashboard
    pub fn start(config: &Config) -> AppResult<Self> {
        let log = init_logger(config);
        tracing::info!(
            environment = %config.environment,
            work_dir = %config.work_dir,
            persist = config.persist,
            webhook = config.sales_webhook_url.is_some(),
            "Starting studio dashboard"
        );
        let dashboard = Dashboard::open(config)?;
        Ok(Self { dashboard, log })
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn logs_to_file(&self) -> bool {
        self.log.writes_to_file()
    }
}
