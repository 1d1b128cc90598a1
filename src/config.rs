use chrono::{FixedOffset, Offset, Utc};
use secrecy::Secret;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, reason } => write!(f, "{key} is invalid: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Report computation settings shared with every handler
#[derive(Debug, Clone, Copy)]
pub struct ReportSettings {
    /// Offset that defines the local calendar day of a record
    pub utc_offset: FixedOffset,
    /// Upper bound on the fetch stage of one report
    pub fetch_timeout: Duration,
    pub max_page_size: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let utc_offset = match optional::<i32>("REPORT_UTC_OFFSET_MINUTES")? {
            Some(minutes) => utc_offset_from_minutes(minutes)?,
            None => defaults.utc_offset,
        };
        let fetch_timeout = optional::<u64>("REPORT_FETCH_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);
        let max_page_size = optional::<u64>("REPORT_MAX_PAGE_SIZE")?
            .unwrap_or(defaults.max_page_size);

        if max_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "REPORT_MAX_PAGE_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            utc_offset,
            fetch_timeout,
            max_page_size,
        })
    }
}

/// Process configuration, read once at startup
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: Secret<String>,
    /// Comma-separated origin allow-list
    pub cors_allowed_origins: String,
    pub bind_address: String,
    pub port: u16,
    pub report: ReportSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: Secret::new(required("JWT_SECRET")?),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: optional::<u16>("PORT")?.unwrap_or(8080),
            report: ReportSettings::from_env()?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn utc_offset_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ConfigError::Invalid {
            key: "REPORT_UTC_OFFSET_MINUTES",
            reason: format!("{minutes} is outside -1439..=1439"),
        })
}
