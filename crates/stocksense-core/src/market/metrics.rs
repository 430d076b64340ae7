use super::PricePoint;
use serde::Serialize;

/// Headline figures for a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceMetrics {
    pub current_price: f64,
    pub previous_close: f64,
    pub change_percent: f64,
    pub period_high: f64,
    pub period_low: f64,
    /// Sample standard deviation of close-to-close returns, in percent
    pub volatility_percent: f64,
}

impl PriceMetrics {
    /// Compute metrics for a series ordered oldest first; `None` when empty
    pub fn from_series(points: &[PricePoint]) -> Option<Self> {
        let last = points.last()?;
        let current_price = last.close;
        let previous_close = points
            .len()
            .checked_sub(2)
            .map_or(current_price, |i| points[i].close);

        let change_percent = if previous_close == 0.0 {
            0.0
        } else {
            (current_price - previous_close) / previous_close * 100.0
        };

        let period_high = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let period_low = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

        Some(Self {
            current_price,
            previous_close,
            change_percent,
            period_high,
            period_low,
            volatility_percent: volatility(points) * 100.0,
        })
    }

    pub fn is_up(&self) -> bool {
        self.change_percent >= 0.0
    }
}

/// Close-to-close returns skip bars whose previous close is zero
fn volatility(points: &[PricePoint]) -> f64 {
    let returns: Vec<f64> = points
        .windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(bars: &[(f64, f64, f64)]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        bars.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PricePoint {
                date: start + Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_known_series() {
        let points = series(&[(101.0, 99.0, 100.0), (112.0, 108.0, 110.0), (105.0, 97.0, 99.0)]);
        let metrics = PriceMetrics::from_series(&points).unwrap();

        assert!(approx(metrics.current_price, 99.0));
        assert!(approx(metrics.previous_close, 110.0));
        assert!(approx(metrics.change_percent, -10.0));
        assert!(approx(metrics.period_high, 112.0));
        assert!(approx(metrics.period_low, 97.0));
        // returns +10% and -10%: sample std = sqrt(0.02)
        assert!(approx(metrics.volatility_percent, 0.02_f64.sqrt() * 100.0));
        assert!(!metrics.is_up());
    }

    #[test]
    fn test_empty_series() {
        assert!(PriceMetrics::from_series(&[]).is_none());
    }

    #[test]
    fn test_single_point() {
        let metrics = PriceMetrics::from_series(&series(&[(12.0, 8.0, 10.0)])).unwrap();
        assert!(approx(metrics.previous_close, 10.0));
        assert!(approx(metrics.change_percent, 0.0));
        assert!(approx(metrics.volatility_percent, 0.0));
        assert!(metrics.is_up());
    }

    #[test]
    fn test_one_return_has_no_volatility() {
        let metrics = PriceMetrics::from_series(&series(&[(1.0, 1.0, 1.0), (2.0, 2.0, 2.0)])).unwrap();
        assert!(approx(metrics.change_percent, 100.0));
        assert!(approx(metrics.volatility_percent, 0.0));
    }

    #[test]
    fn test_zero_previous_close() {
        let metrics = PriceMetrics::from_series(&series(&[(1.0, 0.0, 0.0), (5.0, 4.0, 5.0)])).unwrap();
        assert!(approx(metrics.change_percent, 0.0));
    }
}
