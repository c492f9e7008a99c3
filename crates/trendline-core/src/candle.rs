//! Candle data structures for OHLCV data.

/// OHLCV candle. `timestamp` is the bar open time in whole seconds since epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Min and max close price over a slice of candles, or `None` when empty.
pub fn close_range(candles: &[Candle]) -> Option<(f64, f64)> {
    candles.iter().map(|c| c.close).fold(None, |acc, close| match acc {
        None => Some((close, close)),
        Some((lo, hi)) => Some((lo.min(close), hi.max(close))),
    })
}
