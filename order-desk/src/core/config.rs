use std::path::{Path, PathBuf};

/// Workstation configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory for the order database |
/// | ORDER_DB_FILE | orders.redb | Database file name inside WORK_DIR |
/// | LOG_LEVEL | info | Default log filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Directory for daily rolling log files |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/var/lib/order-desk LOG_LEVEL=debug cargo test
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory, holds the order database
    pub work_dir: String,
    /// Order database file name
    pub db_file: String,
    /// Default log level
    pub log_level: String,
    /// Optional directory for log files
    pub log_dir: Option<String>,
    /// development | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present)
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            db_file: std::env::var("ORDER_DB_FILE").unwrap_or_else(|_| "orders.redb".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the working directory
    ///
    /// Used by tests to point the store at a temporary directory.
    pub fn with_work_dir(work_dir: impl AsRef<Path>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.as_ref().to_string_lossy().into_owned();
        config
    }

    /// Full path of the order database
    pub fn db_path(&self) -> PathBuf {
        Path::new(&self.work_dir).join(&self.db_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
