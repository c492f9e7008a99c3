//! Configuration for the backend client.

use std::time::Duration;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the REST API (default: http://localhost:5000).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: crate::LOCAL_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("trendline-api-rust/{}", crate::VERSION),
        }
    }
}

impl Config {
    /// Create a configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
