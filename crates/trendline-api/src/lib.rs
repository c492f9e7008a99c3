//! # Trendline backend client
//!
//! Async client for the REST surface that stores trendlines remotely and
//! proxies OHLC bars.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trendline_api::{ApiClient, BackendApi, NewTrendline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trendline_api::Error> {
//!     let api = BackendApi::new(ApiClient::local()?);
//!
//!     let created = api
//!         .trendlines()
//!         .create(&NewTrendline::new(1_700_000_000, 43_000.0, 1_700_003_000, 43_500.0))
//!         .await?;
//!     println!("created trendline {}", created.id);
//!
//!     let bars = api.market().ohlc("ETHUSDT").await?;
//!     println!("{} bars", bars.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Validation failures (client-side or a server `400`) carry field-level
//! detail in [`Error::Validation`]. A missing record is [`Error::NotFound`].
//! Everything else surfaces from the endpoint wrappers as
//! [`Error::Failed`] naming the operation that failed.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod market;
pub mod trendlines;
pub mod types;

pub use client::ApiClient;
pub use config::Config;
pub use error::{Error, FieldError, Operation, Result};
pub use market::MarketApi;
pub use trendlines::TrendlinesApi;
pub use types::{NewTrendline, OhlcRecord, TrendlinePatch, TrendlineRecord, DEFAULT_COLOR};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of a locally running backend.
pub const LOCAL_BASE_URL: &str = "http://localhost:5000";

/// Endpoint group wrapper over a shared [`ApiClient`].
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: ApiClient,
}

impl BackendApi {
    /// Wrap a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get the underlying HTTP client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Trendline CRUD endpoints.
    pub fn trendlines(&self) -> TrendlinesApi {
        TrendlinesApi::new(self.client.clone())
    }

    /// Market data endpoints.
    pub fn market(&self) -> MarketApi {
        MarketApi::new(self.client.clone())
    }
}
