use crate::config::model::{
    Config, HttpSettings, DEFAULT_ADAPTER_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SNAPSHOT_PATH, DEFAULT_USER_AGENT,
};
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|name| env::var(name).ok())
}

/// Builds the config from any variable lookup, `std::env` in production.
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let snapshot_path = load_path_config(&lookup, "SNAPSHOT_PATH")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

    let user_agent = lookup("USER_AGENT")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let request_timeout =
        load_secs_config(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?;
    let max_retries = load_parsed_config(&lookup, "MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
    let adapter_timeout =
        load_secs_config(&lookup, "ADAPTER_TIMEOUT_SECS", DEFAULT_ADAPTER_TIMEOUT)?;

    Ok(Config {
        snapshot_path,
        http: HttpSettings {
            user_agent,
            request_timeout,
            max_retries,
        },
        adapter_timeout,
        sources_file: load_path_config(&lookup, "SOURCES_FILE"),
        category_keywords_file: load_path_config(&lookup, "CATEGORY_KEYWORDS_FILE"),
    })
}

fn load_path_config<F>(lookup: &F, name: &str) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn load_parsed_config<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("'{}' is not a valid number", value),
        }),
        None => Ok(default),
    }
}

fn load_secs_config<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = load_parsed_config(lookup, name, default.as_secs())?;

    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}
