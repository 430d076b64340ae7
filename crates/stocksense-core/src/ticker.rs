//! Ticker symbol normalization and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum ticker length in characters, dots included
pub const MAX_TICKER_LEN: usize = 10;

/// Reason a ticker was rejected
///
/// Rules are checked in declaration order; the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("Please select or enter a stock ticker symbol")]
    Empty,

    #[error("Please enter a valid ticker (letters and dots only)")]
    InvalidCharacters,

    #[error("Please enter a valid ticker (1-10 letters, dots allowed)")]
    InvalidLength,
}

/// Trim and uppercase raw user input
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Validate an already-normalized ticker
pub fn validate(raw: &str) -> Result<(), TickerError> {
    if raw.is_empty() {
        return Err(TickerError::Empty);
    }

    if !raw.chars().all(|c| c == '.' || c.is_alphabetic()) {
        return Err(TickerError::InvalidCharacters);
    }

    // Dots alone do not make a symbol
    if !raw.chars().any(char::is_alphabetic) {
        return Err(TickerError::InvalidCharacters);
    }

    let len = raw.chars().count();
    if !(1..=MAX_TICKER_LEN).contains(&len) {
        return Err(TickerError::InvalidLength);
    }

    Ok(())
}

/// A validated, normalized ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalize then validate user input
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        let normalized = normalize(raw);
        validate(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl std::str::FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
