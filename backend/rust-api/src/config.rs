use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("PENDING_REPORT_CRON must not be empty")]
    EmptySchedule,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub port: u16,
    /// Six-field cron expression (with seconds) for the daily pending follow-up report.
    pub pending_report_cron: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("fieldtrack.db"),
            port: 8000,
            pending_report_cron: "0 0 9 * * *".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => defaults.port,
        };
        let pending_report_cron = env::var("PENDING_REPORT_CRON").unwrap_or(defaults.pending_report_cron);
        if pending_report_cron.trim().is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        Ok(Self {
            database_path: env::var("DATABASE_PATH").map(PathBuf::from).unwrap_or(defaults.database_path),
            port,
            pending_report_cron,
        })
    }
}
