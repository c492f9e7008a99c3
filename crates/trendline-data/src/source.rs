//! Data source trait definition.

use trendline_core::Candle;

use crate::{BackendSource, BinanceSource, SyntheticSource};

/// Trait for types that can load candle data for a trading pair.
///
/// This trait uses `anyhow::Result` for flexible error handling. Candles are
/// returned oldest first with timestamps in whole seconds.
#[allow(async_fn_in_trait)]
pub trait OhlcSource {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}

/// The upstream selected by configuration.
pub enum MarketSource {
    Binance(BinanceSource),
    Backend(BackendSource),
    Synthetic(SyntheticSource),
}

impl OhlcSource for MarketSource {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>> {
        match self {
            MarketSource::Binance(s) => s.fetch(symbol).await,
            MarketSource::Backend(s) => s.fetch(symbol).await,
            MarketSource::Synthetic(s) => s.fetch(symbol).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MarketSource::Binance(s) => s.name(),
            MarketSource::Backend(s) => s.name(),
            MarketSource::Synthetic(s) => s.name(),
        }
    }
}

/// Fetch candles, surfacing any failure as an empty result.
///
/// Callers treat an empty result as "keep the last dataset".
pub async fn fetch_or_empty<S: OhlcSource>(source: &S, symbol: &str) -> Vec<Candle> {
    match source.fetch(symbol).await {
        Ok(candles) => candles,
        Err(e) => {
            log::warn!("{} fetch for {symbol} failed: {e:#}", source.name());
            Vec::new()
        }
    }
}
