use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub palette_wait: Duration,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of milliseconds, got `{value}`")]
    InvalidMillis { name: &'static str, value: String },
    #[error("{name} must be true or false, got `{value}`")]
    InvalidBool { name: &'static str, value: String },
}

impl Settings {
    pub fn load() -> Result<Settings, ConfigError> {
        let _ = dotenvy::dotenv();
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());

        let palette_wait = match lookup("ERICA_PALETTE_WAIT_MS") {
            Some(value) => {
                let millis = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidMillis {
                    name: "ERICA_PALETTE_WAIT_MS",
                    value: value.clone(),
                })?;
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(300),
        };

        let log_level = lookup("ERICA_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let json = match lookup("ERICA_LOG_JSON") {
            Some(value) => parse_bool("ERICA_LOG_JSON", &value)?,
            None => false,
        };

        Ok(Settings {
            database_url,
            palette_wait,
            telemetry: TelemetrySettings { log_level, json },
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}
