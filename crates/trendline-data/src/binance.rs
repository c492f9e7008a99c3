//! Binance public klines data source.

use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use trendline_core::Candle;

use crate::source::OhlcSource;
use crate::validation::retain_valid;

/// Default Binance REST base URL.
pub const BINANCE_URL: &str = "https://api.binance.com";

/// Binance data source for fetching kline data.
pub struct BinanceSource {
    http: reqwest::Client,
    base_url: String,
    interval: String,
    limit: u32,
}

impl BinanceSource {
    /// Create a new Binance data source.
    ///
    /// # Arguments
    /// * `base_url` - REST base, e.g. [`BINANCE_URL`]
    /// * `interval` - Kline interval (e.g., "5m")
    /// * `limit` - Number of bars per request
    pub fn new(base_url: &str, interval: &str, limit: u32) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: interval.to_string(),
            limit,
        })
    }

    fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url)
    }
}

impl OhlcSource for BinanceSource {
    async fn fetch(&self, symbol: &str) -> anyhow::Result<Vec<Candle>> {
        let symbol = symbol.to_uppercase();
        log::debug!("fetching {} {} klines for {symbol}", self.limit, self.interval);

        let response = self
            .http
            .get(self.klines_url())
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", self.interval.as_str()),
                ("limit", &self.limit.to_string()),
            ])
            .send()
            .await
            .context("Binance request failed")?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("Binance returned HTTP {status}: {body}");
        }

        parse_klines(&body)
    }

    fn name(&self) -> &'static str {
        "binance"
    }
}

/// Decode a klines response body into candles, oldest first.
pub fn parse_klines(body: &str) -> anyhow::Result<Vec<Candle>> {
    let klines: Vec<Kline> = serde_json::from_str(body).context("invalid klines payload")?;
    Ok(retain_valid(klines.iter().map(kline_to_candle).collect()))
}

/// One kline row. Binance sends these as positional arrays with prices as strings.
#[derive(Debug, Clone)]
struct Kline {
    open_time: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

// Custom deserializer for Kline since it comes as an array
impl<'de> Deserialize<'de> for Kline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let arr: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;

        if arr.len() < 6 {
            return Err(D::Error::custom("kline array too short"));
        }

        let parse_decimal = |v: &serde_json::Value| -> Result<Decimal, D::Error> {
            match v {
                serde_json::Value::String(s) => s
                    .parse::<Decimal>()
                    .map_err(|e| D::Error::custom(format!("invalid decimal: {e}"))),
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| D::Error::custom("invalid number"))
                    .and_then(|f| {
                        Decimal::try_from(f)
                            .map_err(|e| D::Error::custom(format!("invalid decimal: {e}")))
                    }),
                _ => Err(D::Error::custom("expected string or number")),
            }
        };

        Ok(Kline {
            open_time: arr[0]
                .as_i64()
                .ok_or_else(|| D::Error::custom("expected integer open time"))?,
            open: parse_decimal(&arr[1])?,
            high: parse_decimal(&arr[2])?,
            low: parse_decimal(&arr[3])?,
            close: parse_decimal(&arr[4])?,
            volume: parse_decimal(&arr[5])?,
        })
    }
}

fn kline_to_candle(kline: &Kline) -> Candle {
    Candle::new(
        kline.open_time.div_euclid(1000), // ms → seconds
        kline.open.to_f64().unwrap_or(f64::NAN),
        kline.high.to_f64().unwrap_or(f64::NAN),
        kline.low.to_f64().unwrap_or(f64::NAN),
        kline.close.to_f64().unwrap_or(f64::NAN),
        kline.volume.to_f64().unwrap_or(f64::NAN),
    )
}
