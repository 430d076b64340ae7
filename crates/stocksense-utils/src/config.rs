//! Environment configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but malformed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct EnvError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Read a non-empty environment variable as a string
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank, and an error when it
/// is set but does not parse as `T`.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key).map_or(Ok(None), |raw| parse_value(key, &raw).map(Some))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| EnvError {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
