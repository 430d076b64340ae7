//! TTL cache in front of a price provider

use super::{HistoryPeriod, PriceHistoryProvider, PricePoint};
use crate::error::Result;
use crate::ticker::Ticker;
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    ticker: Ticker,
    period: HistoryPeriod,
}

/// Caches successful lookups of the wrapped provider for a fixed lifespan
///
/// Failures are never cached, so the next call retries the provider.
pub struct CachedPriceProvider<P> {
    inner: P,
    cache: Arc<RwLock<TimedCache<PriceKey, Vec<PricePoint>>>>,
}

impl<P: PriceHistoryProvider> CachedPriceProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn clear(&self) {
        self.cache.write().await.cache_clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<P: PriceHistoryProvider> PriceHistoryProvider for CachedPriceProvider<P> {
    async fn price_history(&self, ticker: &Ticker, period: HistoryPeriod) -> Result<Vec<PricePoint>> {
        let key = PriceKey {
            ticker: ticker.clone(),
            period,
        };

        if let Some(points) = self.cache.write().await.cache_get(&key).cloned() {
            debug!("Price cache hit for {} ({})", ticker, period);
            return Ok(points);
        }

        debug!("Price cache miss for {} ({})", ticker, period);
        let points = self.inner.price_history(ticker, period).await?;
        self.cache.write().await.cache_set(key, points.clone());

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SenseError;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl PriceHistoryProvider for CountingProvider {
        async fn price_history(&self, _ticker: &Ticker, _period: HistoryPeriod) -> Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SenseError::MarketData("rate limited".to_string()));
            }
            Ok(vec![PricePoint {
                date: Utc::now(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
            }])
        }
    }

    fn ticker(raw: &str) -> Ticker {
        Ticker::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_second_read_is_cached() {
        let cached = CachedPriceProvider::new(CountingProvider::default(), Duration::from_secs(60));

        let first = cached.price_history(&ticker("MSFT"), HistoryPeriod::OneMonth).await.unwrap();
        let second = cached.price_history(&ticker("MSFT"), HistoryPeriod::OneMonth).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn test_key_includes_period_and_ticker() {
        let cached = CachedPriceProvider::new(CountingProvider::default(), Duration::from_secs(60));

        cached.price_history(&ticker("MSFT"), HistoryPeriod::OneMonth).await.unwrap();
        cached.price_history(&ticker("MSFT"), HistoryPeriod::OneYear).await.unwrap();
        cached.price_history(&ticker("AAPL"), HistoryPeriod::OneMonth).await.unwrap();

        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);

        cached.clear().await;
        assert!(cached.is_empty().await);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let provider = CountingProvider {
            fail: true,
            ..Default::default()
        };
        let cached = CachedPriceProvider::new(provider, Duration::from_secs(60));

        assert!(cached.price_history(&ticker("TSLA"), HistoryPeriod::FiveDays).await.is_err());
        assert!(cached.price_history(&ticker("TSLA"), HistoryPeriod::FiveDays).await.is_err());
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }
}
