//! Yahoo Finance price history

use super::{HistoryPeriod, PriceHistoryProvider, PricePoint};
use crate::error::{Result, SenseError};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Daily bars from the public Yahoo chart API
#[derive(Debug, Default, Clone, Copy)]
pub struct YahooPriceProvider;

impl YahooPriceProvider {
    pub fn new() -> Self {
        Self
    }
}

fn to_offset(at: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map_err(|e| SenseError::MarketData(format!("Invalid timestamp: {e}")))
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceProvider {
    async fn price_history(&self, ticker: &Ticker, period: HistoryPeriod) -> Result<Vec<PricePoint>> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| SenseError::MarketData(e.to_string()))?;

        let end = Utc::now();
        let start = period.start_from(end);

        let response = provider
            .get_quote_history(ticker.as_str(), to_offset(start)?, to_offset(end)?)
            .await
            .map_err(|e| SenseError::MarketData(e.to_string()))?;

        // Yahoo reports unknown or delisted symbols as an empty chart
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!("No quotes for {} ({}): {}", ticker, period, e);
                return Ok(Vec::new());
            }
        };

        Ok(quotes
            .iter()
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|date| PricePoint {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                })
            })
            .collect())
    }
}
