//! Market data loading for the trendline editor.

pub mod backend;
pub mod binance;
pub mod fallback;
pub mod source;
pub mod synthetic;
pub mod validation;

pub use backend::BackendSource;
pub use binance::BinanceSource;
pub use fallback::FallbackSource;
pub use source::{fetch_or_empty, MarketSource, OhlcSource};
pub use synthetic::SyntheticSource;
pub use validation::{retain_valid, validate_candle};
