//! Core types for the trendline workspace.
//!
//! This crate provides fundamental data structures with no external dependencies:
//! - `Candle` - OHLCV candle data keyed by whole seconds
//! - `TradingPair` - Supported symbols and their reference prices

pub mod candle;
pub mod pair;

pub use candle::{close_range, Candle};
pub use pair::{TradingPair, DEFAULT_BASE_PRICE, TRADING_PAIRS};
