//! HTTP client for the trendline backend.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::config::Config;
use crate::error::{error_from_response, Result};

/// HTTP client for making requests to the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<Config>,
    http: Client,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Create a client for a backend on localhost.
    pub fn local() -> Result<Self> {
        Self::new(Config::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve an endpoint path against the configured base URL.
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http.request(method, url))
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let mut request = self.request(Method::GET, endpoint)?;
        if let Some(params) = params {
            request = request.query(&params);
        }
        self.execute(request, endpoint).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let request = self.request(Method::POST, endpoint)?.json(body);
        self.execute(request, endpoint).await
    }

    /// Make a PATCH request with a JSON body.
    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let request = self.request(Method::PATCH, endpoint)?.json(body);
        self.execute(request, endpoint).await
    }

    /// Make a DELETE request. The backend answers `204 No Content`.
    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        let request = self.request(Method::DELETE, endpoint)?;
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(error_from_response(status.as_u16(), &body, endpoint))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> Result<T> {
        log::debug!("backend request {endpoint}");
        let response = request.send().await?;
        self.handle_response(response, endpoint).await
    }

    /// Handle the backend response.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response, endpoint: &str) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &body, endpoint));
        }

        let body = if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };

        serde_json::from_str(body).map_err(|e| {
            log::error!("Failed to parse response from {endpoint}: {body}");
            e.into()
        })
    }
}
