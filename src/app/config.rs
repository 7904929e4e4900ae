use crate::buffer::DrainPolicy;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about = "Buffers simulated sensor readings and persists them in the background", long_about = None)]
#[serde(default)]
pub struct Config {
    /// Number of concurrent producers generating readings
    #[arg(long, env = "PRODUCERS", default_value = "4")]
    pub producers: usize,

    /// Interval between readings of one producer, in milliseconds
    #[arg(long, env = "SAMPLE_INTERVAL_MS", default_value = "100")]
    pub sample_interval_ms: u64,

    /// Stop after this many seconds (runs until Ctrl+C when unset)
    #[arg(long, env = "RUN_SECS")]
    pub run_secs: Option<u64>,

    /// What to do with queued readings on shutdown
    #[arg(long, env = "DRAIN_POLICY", default_value = "graceful")]
    pub drain_policy: DrainPolicy,

    /// Simulated latency of every store call, in milliseconds
    #[arg(long, env = "STORE_LATENCY_MS", default_value = "20")]
    pub store_latency_ms: u64,

    /// Fraction of store calls that fail (0.0 to 1.0)
    #[arg(long, env = "STORE_FAILURE_RATE", default_value = "0.0")]
    pub store_failure_rate: f64,

    /// Log running statistics every N appended values
    #[arg(long, env = "REPORT_EVERY", default_value = "50")]
    pub report_every: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Print Prometheus metrics on exit
    #[arg(long, env = "PRINT_METRICS")]
    pub print_metrics: bool,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub sample_interval: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub store_latency: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub run_duration: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            producers: 4,
            sample_interval_ms: 100,
            run_secs: None,
            drain_policy: DrainPolicy::Graceful,
            store_latency_ms: 20,
            store_failure_rate: 0.0,
            report_every: 50,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            print_metrics: false,
            config_file: None,
            sample_interval: Duration::from_millis(100),
            store_latency: Duration::from_millis(20),
            run_duration: None,
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn post_process(&mut self) {
        self.sample_interval = Duration::from_millis(self.sample_interval_ms);
        self.store_latency = Duration::from_millis(self.store_latency_ms);
        self.run_duration = self.run_secs.map(Duration::from_secs);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producers == 0 {
            return Err(ConfigError::InvalidConfig(
                "Producers must be greater than 0".to_string(),
            ));
        }

        if self.sample_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Sample interval must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.store_failure_rate) {
            return Err(ConfigError::InvalidConfig(format!(
                "Store failure rate must be between 0.0 and 1.0, got {}",
                self.store_failure_rate
            )));
        }

        if self.run_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Run duration must be greater than 0 when set".to_string(),
            ));
        }

        if self.report_every == 0 {
            return Err(ConfigError::InvalidConfig(
                "Report interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
