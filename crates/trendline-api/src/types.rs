//! Wire types for the backend REST surface.

use serde::{Deserialize, Serialize};

use crate::error::{Error, FieldError, Result};

/// Color the backend assigns when a record has none.
pub const DEFAULT_COLOR: &str = "#2962FF";

/// Stored trendline as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendlineRecord {
    /// Server-assigned id.
    pub id: i64,
    /// Owning user, if any.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Start point time in seconds.
    pub start_timestamp: i64,
    /// Start point price.
    pub start_price: f64,
    /// End point time in seconds.
    pub end_timestamp: i64,
    /// End point price.
    pub end_price: f64,
    /// Line color; absent on records stored without one.
    #[serde(default)]
    pub color: Option<String>,
    /// Creation time as reported by the server.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TrendlineRecord {
    /// Line color, falling back to [`DEFAULT_COLOR`].
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }
}

/// Body of `POST /api/trendlines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrendline {
    /// Owning user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Start point time in seconds.
    pub start_timestamp: i64,
    /// Start point price.
    pub start_price: f64,
    /// End point time in seconds.
    pub end_timestamp: i64,
    /// End point price.
    pub end_price: f64,
    /// Line color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewTrendline {
    /// Create an insert body with the default color.
    pub fn new(start_timestamp: i64, start_price: f64, end_timestamp: i64, end_price: f64) -> Self {
        Self {
            user_id: None,
            start_timestamp,
            start_price,
            end_timestamp,
            end_price,
            color: Some(DEFAULT_COLOR.to_string()),
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check the body before it goes on the wire.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        check_timestamp(&mut fields, "startTimestamp", self.start_timestamp);
        check_price(&mut fields, "startPrice", self.start_price);
        check_timestamp(&mut fields, "endTimestamp", self.end_timestamp);
        check_price(&mut fields, "endPrice", self.end_price);
        if let Some(color) = &self.color {
            check_color(&mut fields, color);
        }
        finish(fields)
    }
}

/// Body of `PATCH /api/trendlines/:id`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendlinePatch {
    /// New start time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
    /// New start price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_price: Option<f64>,
    /// New end time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,
    /// New end price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_price: Option<f64>,
    /// New color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TrendlinePatch {
    /// Patch replacing both endpoints.
    pub fn endpoints(start_timestamp: i64, start_price: f64, end_timestamp: i64, end_price: f64) -> Self {
        Self {
            start_timestamp: Some(start_timestamp),
            start_price: Some(start_price),
            end_timestamp: Some(end_timestamp),
            end_price: Some(end_price),
            color: None,
        }
    }

    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.start_timestamp.is_none()
            && self.start_price.is_none()
            && self.end_timestamp.is_none()
            && self.end_price.is_none()
            && self.color.is_none()
    }

    /// Check the present fields.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if let Some(ts) = self.start_timestamp {
            check_timestamp(&mut fields, "startTimestamp", ts);
        }
        if let Some(price) = self.start_price {
            check_price(&mut fields, "startPrice", price);
        }
        if let Some(ts) = self.end_timestamp {
            check_timestamp(&mut fields, "endTimestamp", ts);
        }
        if let Some(price) = self.end_price {
            check_price(&mut fields, "endPrice", price);
        }
        if let Some(color) = &self.color {
            check_color(&mut fields, color);
        }
        finish(fields)
    }
}

/// One bar from `GET /api/ohlc`. Timestamps are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcRecord {
    /// Bar open time in seconds.
    pub timestamp: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

fn check_timestamp(fields: &mut Vec<FieldError>, name: &str, value: i64) {
    if value < 0 {
        fields.push(FieldError::new(name, "Number must be greater than or equal to 0"));
    }
}

fn check_price(fields: &mut Vec<FieldError>, name: &str, value: f64) {
    if !value.is_finite() {
        fields.push(FieldError::new(name, "Expected a finite number"));
    }
}

fn check_color(fields: &mut Vec<FieldError>, color: &str) {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        fields.push(FieldError::new("color", "Expected a #RRGGBB color"));
    }
}

fn finish(fields: Vec<FieldError>) -> Result<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(fields))
    }
}
