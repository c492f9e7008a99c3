//! Supported trading pairs.

/// A tradable symbol with the reference price used to seed synthetic data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradingPair {
    pub symbol: &'static str,
    pub base_price: f64,
}

/// Reference price used for symbols missing from [`TRADING_PAIRS`].
pub const DEFAULT_BASE_PRICE: f64 = 43000.0;

pub const TRADING_PAIRS: &[TradingPair] = &[
    TradingPair { symbol: "BTCUSDT", base_price: 95842.50 },
    TradingPair { symbol: "ETHUSDT", base_price: 3245.67 },
    TradingPair { symbol: "ADAUSDT", base_price: 0.8956 },
    TradingPair { symbol: "DOTUSDT", base_price: 7.234 },
    TradingPair { symbol: "LINKUSDT", base_price: 23.45 },
    TradingPair { symbol: "MATICUSDT", base_price: 1.234 },
    TradingPair { symbol: "SOLUSDT", base_price: 156.78 },
    TradingPair { symbol: "AVAXUSDT", base_price: 34.56 },
];

impl TradingPair {
    /// Look up a pair by symbol (case-insensitive).
    pub fn find(symbol: &str) -> Option<&'static TradingPair> {
        TRADING_PAIRS
            .iter()
            .find(|pair| pair.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Reference price for a symbol, falling back to [`DEFAULT_BASE_PRICE`].
    pub fn base_price_for(symbol: &str) -> f64 {
        Self::find(symbol).map_or(DEFAULT_BASE_PRICE, |pair| pair.base_price)
    }
}
