//! Primary/secondary source combinator.

use trendline_core::Candle;

use crate::source::OhlcSource;

/// Tries `primary`, then `secondary` when the primary errors or returns nothing.
pub struct FallbackSource<P, S> {
    primary: P,
    secondary: Option<S>,
}

impl<P: OhlcSource, S: OhlcSource> FallbackSource<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Wrap a source without a fallback.
    pub fn primary_only(primary: P) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }
}

impl<P: OhlcSource, S: OhlcSource> OhlcSource for FallbackSource<P, S> {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>> {
        let primary = self.primary.fetch(symbol).await;
        let Some(secondary) = &self.secondary else {
            return primary;
        };

        match primary {
            Ok(candles) if !candles.is_empty() => Ok(candles),
            Ok(_) => {
                log::warn!("{} returned no bars for {symbol}, using {}", self.primary.name(), secondary.name());
                secondary.fetch(symbol).await
            }
            Err(e) => {
                log::warn!("{} failed for {symbol} ({e:#}), using {}", self.primary.name(), secondary.name());
                secondary.fetch(symbol).await
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}
