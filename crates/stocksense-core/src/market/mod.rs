//! Price history for display alongside analyses
//!
//! Market data is consumed read-only. Providers sit behind
//! [`PriceHistoryProvider`] so the Yahoo connector can be cached or swapped.

mod cache;
mod metrics;
mod yahoo;

pub use cache::CachedPriceProvider;
pub use metrics::PriceMetrics;
pub use yahoo::YahooPriceProvider;

use crate::error::{Result, SenseError};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One daily bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Lookback window, using Yahoo's range tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl HistoryPeriod {
    pub const ALL: [HistoryPeriod; 11] = [
        HistoryPeriod::OneDay,
        HistoryPeriod::FiveDays,
        HistoryPeriod::OneMonth,
        HistoryPeriod::ThreeMonths,
        HistoryPeriod::SixMonths,
        HistoryPeriod::OneYear,
        HistoryPeriod::TwoYears,
        HistoryPeriod::FiveYears,
        HistoryPeriod::TenYears,
        HistoryPeriod::YearToDate,
        HistoryPeriod::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::FiveDays => "5d",
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::TenYears => "10y",
            HistoryPeriod::YearToDate => "ytd",
            HistoryPeriod::Max => "max",
        }
    }

    /// Start of the window ending at `end`
    pub fn start_from(self, end: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            HistoryPeriod::OneDay => 1,
            HistoryPeriod::FiveDays => 5,
            HistoryPeriod::OneMonth => 30,
            HistoryPeriod::ThreeMonths => 90,
            HistoryPeriod::SixMonths => 180,
            HistoryPeriod::OneYear => 365,
            HistoryPeriod::TwoYears => 730,
            HistoryPeriod::FiveYears => 1825,
            HistoryPeriod::TenYears => 3650,
            HistoryPeriod::Max => 36500, // ~100 years
            HistoryPeriod::YearToDate => {
                return Utc
                    .with_ymd_and_hms(end.year(), 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or(end);
            }
        };
        end - Duration::days(days)
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryPeriod {
    type Err = SenseError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == token)
            .ok_or_else(|| SenseError::Config(format!("Invalid history period: {s}")))
    }
}

/// Source of historical prices
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Daily bars for `ticker` over `period`, oldest first. An empty vector
    /// means the provider has no data.
    async fn price_history(&self, ticker: &Ticker, period: HistoryPeriod) -> Result<Vec<PricePoint>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_tokens_round_trip() {
        for period in HistoryPeriod::ALL {
            assert_eq!(period.as_str().parse::<HistoryPeriod>().unwrap(), period);
        }
        assert_eq!(" 1MO ".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::OneMonth);
        assert!("2w".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn test_period_serde_uses_tokens() {
        let json = serde_json::to_string(&HistoryPeriod::YearToDate).unwrap();
        assert_eq!(json, "\"ytd\"");
        let parsed: HistoryPeriod = serde_json::from_str("\"6mo\"").unwrap();
        assert_eq!(parsed, HistoryPeriod::SixMonths);
    }

    #[test]
    fn test_period_start() {
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            HistoryPeriod::FiveDays.start_from(end),
            Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
        );
        assert_eq!(
            HistoryPeriod::YearToDate.start_from(end),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
