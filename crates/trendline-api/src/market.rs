//! Market data proxied by the backend.

use std::collections::HashMap;

use crate::client::ApiClient;
use crate::error::{Operation, Result};
use crate::types::OhlcRecord;

/// Market data API.
#[derive(Debug, Clone)]
pub struct MarketApi {
    client: ApiClient,
}

impl MarketApi {
    /// Create a new market API instance.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get recent OHLC bars for `symbol` (e.g. "BTCUSDT").
    ///
    /// # Example
    /// ```ignore
    /// let bars = market.ohlc("BTCUSDT").await?;
    /// println!("last close: {}", bars.last().map(|b| b.close).unwrap_or_default());
    /// ```
    pub async fn ohlc(&self, symbol: &str) -> Result<Vec<OhlcRecord>> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), symbol.to_uppercase());

        self.client
            .get("/api/ohlc", Some(params))
            .await
            .map_err(|e| e.in_operation(Operation::FetchOhlc))
    }
}
