// src/config.rs
use crate::domain::booking::RefundPolicy;
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Booking service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service-level settings
    pub service: ServiceConfig,

    /// Refund policy settings
    pub refund: RefundConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Currency used for wallets and bookings (e.g. "VND")
    pub default_currency: String,
}

/// Refund windows measured in hours before the scheduled start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundConfig {
    /// Cancellations at least this far out are refunded in full
    pub full_refund_hours: i64,

    /// Cancellations at least this far out get the partial percentage
    pub partial_refund_hours: i64,

    /// Partial refund percentage (e.g. 50)
    pub partial_refund_percent: Decimal,
}

impl RefundConfig {
    pub fn to_policy(&self) -> RefundPolicy {
        RefundPolicy {
            full_refund_hours: self.full_refund_hours,
            partial_refund_hours: self.partial_refund_hours,
            partial_refund_percent: self.partial_refund_percent,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = RefundPolicy::default();

        let service = ServiceConfig {
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "VND".to_string()),
        };

        let refund = RefundConfig {
            full_refund_hours: env::var("FULL_REFUND_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.full_refund_hours),
            partial_refund_hours: env::var("PARTIAL_REFUND_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.partial_refund_hours),
            partial_refund_percent: env::var("PARTIAL_REFUND_PERCENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.partial_refund_percent),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            service,
            refund,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::Config(format!("Failed to open config file: {}", e)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let defaults = RefundPolicy::default();
        Self {
            service: ServiceConfig {
                default_currency: "VND".to_string(),
            },
            refund: RefundConfig {
                full_refund_hours: defaults.full_refund_hours,
                partial_refund_hours: defaults.partial_refund_hours,
                partial_refund_percent: defaults.partial_refund_percent,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
