//! OHLC bars served by the trendline backend.

use trendline_api::{ApiClient, MarketApi, OhlcRecord};
use trendline_core::Candle;

use crate::source::OhlcSource;
use crate::validation::retain_valid;

/// Data source reading the backend `/api/ohlc` proxy.
pub struct BackendSource {
    market: MarketApi,
}

impl BackendSource {
    pub fn new(client: ApiClient) -> Self {
        Self {
            market: MarketApi::new(client),
        }
    }
}

impl OhlcSource for BackendSource {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>> {
        let records = self.market.ohlc(symbol).await?;
        Ok(retain_valid(records.iter().map(record_to_candle).collect()))
    }

    fn name(&self) -> &'static str {
        "backend"
    }
}

fn record_to_candle(record: &OhlcRecord) -> Candle {
    Candle::new(
        record.timestamp,
        record.open,
        record.high,
        record.low,
        record.close,
        record.volume,
    )
}
