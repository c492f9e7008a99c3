//! Validation utilities for market data.

use trendline_core::Candle;

/// Validate a candle has reasonable values.
pub fn validate_candle(candle: &Candle) -> bool {
    candle.open.is_finite()
        && candle.high.is_finite()
        && candle.low.is_finite()
        && candle.close.is_finite()
        && candle.volume.is_finite()
        && candle.high >= candle.low
        && candle.open > 0.0
        && candle.close > 0.0
        && candle.low > 0.0
        && candle.volume >= 0.0
        && candle.timestamp >= 0
}

/// Drop invalid candles and sort the rest oldest first.
pub fn retain_valid(mut candles: Vec<Candle>) -> Vec<Candle> {
    let before = candles.len();
    candles.retain(validate_candle);
    if candles.len() != before {
        log::warn!("dropped {} invalid candles", before - candles.len());
    }
    candles.sort_by_key(|c| c.timestamp);
    candles
}
