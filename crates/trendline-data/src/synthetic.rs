//! Locally generated random-walk candles.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};
use trendline_core::{Candle, TradingPair};

use crate::source::OhlcSource;

/// Number of bars generated per fetch.
pub const BAR_COUNT: usize = 100;
/// Spacing between bars in seconds (5 minutes).
pub const BAR_SPACING_SECS: i64 = 300;

const VOLATILITY: f64 = 0.02;
const WICK: f64 = 0.01;

/// Random-walk data source used offline and as a fallback.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source producing the same walk on every fetch.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl OhlcSource for SyntheticSource {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
        Ok(generate(&mut self.rng(), TradingPair::base_price_for(symbol), now))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

/// Generate [`BAR_COUNT`] bars ending one spacing before `now`.
///
/// Each close moves up to ±1 % from the open (2 % range); wicks extend up to
/// 1 % of the running price beyond the body. Prices are rounded to
/// [`price_decimals`] of `base_price`.
pub fn generate<R: Rng>(rng: &mut R, base_price: f64, now: i64) -> Vec<Candle> {
    let decimals = price_decimals(base_price);
    let round = |value: f64| round_to(value, decimals);
    let mut price = base_price;
    let mut candles = Vec::with_capacity(BAR_COUNT);

    for i in 0..BAR_COUNT {
        let timestamp = now - (BAR_COUNT - i) as i64 * BAR_SPACING_SECS;
        let change = (rng.gen::<f64>() - 0.5) * price * VOLATILITY;

        let open = price;
        let close = open + change;
        let high = open.max(close) + rng.gen::<f64>() * price * WICK;
        let low = open.min(close) - rng.gen::<f64>() * price * WICK;
        let volume = rng.gen_range(100..1100) as f64;

        candles.push(Candle::new(
            timestamp,
            round(open),
            round(high),
            round(low),
            round(close),
            volume,
        ));

        price = close;
    }

    candles
}

/// Decimal places that keep about five significant digits, never fewer than cents.
pub fn price_decimals(base_price: f64) -> i32 {
    if !base_price.is_finite() || base_price <= 0.0 {
        return 2;
    }
    (4 - base_price.log10().floor() as i32).clamp(2, 8)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let candles = generate(&mut rng, 43_000.0, 1_700_000_000);

        assert_eq!(candles.len(), BAR_COUNT);
        assert_eq!(candles[0].timestamp, 1_700_000_000 - 100 * 300);
        assert_eq!(candles[99].timestamp, 1_700_000_000 - 300);
        assert_eq!(candles[0].open, 43_000.0);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, BAR_SPACING_SECS);
        }
    }

    #[test]
    fn test_generate_bars_are_consistent() {
        let mut rng = StdRng::seed_from_u64(1);
        for candle in generate(&mut rng, 3245.67, 1_700_000_000) {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
            assert!((100.0..1100.0).contains(&candle.volume));
            assert_eq!(round_to(candle.close, 2), candle.close);
        }
    }

    #[test]
    fn test_price_decimals_follow_magnitude() {
        assert_eq!(price_decimals(95_842.5), 2);
        assert_eq!(price_decimals(156.78), 2);
        assert_eq!(price_decimals(23.45), 3);
        assert_eq!(price_decimals(7.234), 4);
        assert_eq!(price_decimals(0.8956), 5);
        assert_eq!(price_decimals(0.0), 2);
        assert_eq!(price_decimals(f64::NAN), 2);
    }

    #[test]
    fn test_sub_dollar_pair_keeps_precision() {
        let mut rng = StdRng::seed_from_u64(7);
        let candles = generate(&mut rng, 0.8956, 1_700_000_000);

        assert_eq!(candles[0].open, 0.8956);
        for candle in &candles {
            assert_eq!(round_to(candle.close, 5), candle.close);
        }
        // Steps finer than a cent survive rounding
        assert!(candles.iter().any(|c| round_to(c.close, 2) != c.close));
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let a = generate(&mut StdRng::seed_from_u64(9), 100.0, 1_000_000);
        let b = generate(&mut StdRng::seed_from_u64(9), 100.0, 1_000_000);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_uses_pair_base_price() {
        let candles = SyntheticSource::seeded(3).fetch("ETHUSDT").await.unwrap();
        assert_eq!(candles[0].open, 3245.67);
    }
}
