//! Trendline types for interactive chart annotations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::coords::{DomainPoint, PixelPos};

/// Last millisecond value handed out as a trendline id.
static LAST_ISSUED_MS: AtomicI64 = AtomicI64::new(0);

/// Default color for new trendlines.
pub const DEFAULT_TRENDLINE_COLOR: &str = "#2962FF";

/// Opaque trendline identifier.
///
/// Generated ids are the creation time in milliseconds, rendered as a decimal
/// string. Generation is monotonic within the process, so an id is never
/// handed out twice even when two lines are created in the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendlineId(String);

impl TrendlineId {
    /// Generate a new unique id from the current time.
    pub fn generate() -> Self {
        Self::generate_at(chrono::Utc::now().timestamp_millis())
    }

    fn generate_at(now_ms: i64) -> Self {
        let prev = match LAST_ISSUED_MS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_ms.max(last + 1))
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        Self(now_ms.max(prev + 1).to_string())
    }

    /// Make sure generated ids stay above `id` when it is numeric.
    ///
    /// Called for every id loaded from storage.
    pub fn reserve(id: &TrendlineId) {
        if let Ok(ms) = id.0.parse::<i64>() {
            LAST_ISSUED_MS.fetch_max(ms, Ordering::SeqCst);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrendlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrendlineId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TrendlineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which end of a trendline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
        }
    }
}

/// A trendline endpoint: authoritative domain position plus cached pixel hint.
///
/// The pixel hint is only valid for the viewport it was computed in and is
/// refreshed whenever the viewport changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendlinePoint {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub price: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

impl TrendlinePoint {
    pub fn new(domain: DomainPoint, pixel: PixelPos) -> Self {
        Self {
            timestamp: domain.timestamp,
            price: domain.price,
            pixel_x: pixel.x,
            pixel_y: pixel.y,
        }
    }

    /// Point with zeroed pixel hints (e.g. freshly loaded from storage).
    pub fn unplaced(timestamp: i64, price: f64) -> Self {
        Self {
            timestamp,
            price,
            pixel_x: 0.0,
            pixel_y: 0.0,
        }
    }

    pub fn domain(&self) -> DomainPoint {
        DomainPoint::new(self.timestamp, self.price)
    }

    pub fn pixel(&self) -> PixelPos {
        PixelPos::new(self.pixel_x, self.pixel_y)
    }
}

/// A committed trendline. Both endpoints are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Trendline {
    pub id: TrendlineId,
    pub start: TrendlinePoint,
    pub end: TrendlinePoint,
    pub color: String,
}

impl Trendline {
    /// New trendline with a freshly generated id.
    pub fn new(start: TrendlinePoint, end: TrendlinePoint, color: impl Into<String>) -> Self {
        Self {
            id: TrendlineId::generate(),
            start,
            end,
            color: color.into(),
        }
    }

    pub fn with_id(id: impl Into<TrendlineId>, start: TrendlinePoint, end: TrendlinePoint, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            color: color.into(),
        }
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> &TrendlinePoint {
        match endpoint {
            Endpoint::Start => &self.start,
            Endpoint::End => &self.end,
        }
    }

    pub fn endpoint_mut(&mut self, endpoint: Endpoint) -> &mut TrendlinePoint {
        match endpoint {
            Endpoint::Start => &mut self.start,
            Endpoint::End => &mut self.end,
        }
    }

    /// Both endpoints, start first.
    pub fn endpoints(&self) -> [(Endpoint, &TrendlinePoint); 2] {
        [(Endpoint::Start, &self.start), (Endpoint::End, &self.end)]
    }

    /// Price change from start to end in percent, `None` when the start price is zero.
    pub fn slope_percent(&self) -> Option<f64> {
        if self.start.price == 0.0 {
            return None;
        }
        Some((self.end.price - self.start.price) / self.start.price * 100.0)
    }
}

/// The endpoint a drag or hover refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DragTarget {
    pub trendline_id: TrendlineId,
    pub endpoint: Endpoint,
}

impl DragTarget {
    pub fn new(trendline_id: TrendlineId, endpoint: Endpoint) -> Self {
        Self { trendline_id, endpoint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Current time in ms, or the counter if another test moved it ahead.
    fn counter_floor() -> i64 {
        chrono::Utc::now()
            .timestamp_millis()
            .max(LAST_ISSUED_MS.load(Ordering::SeqCst))
    }

    #[test]
    fn test_generated_ids_are_unique_within_a_millisecond() {
        let now = counter_floor();
        let a = TrendlineId::generate_at(now);
        let b = TrendlineId::generate_at(now);
        assert_ne!(a, b);
        let a: i64 = a.as_str().parse().unwrap();
        let b: i64 = b.as_str().parse().unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_reserve_skips_loaded_ids() {
        // A few ms ahead keeps the shared counter near real time for other tests.
        let loaded_ms = counter_floor() + 5;
        TrendlineId::reserve(&TrendlineId::from(loaded_ms.to_string().as_str()));
        let next: i64 = TrendlineId::generate_at(1).as_str().parse().unwrap();
        assert!(next > loaded_ms);
    }

    #[test]
    fn test_non_numeric_ids_are_ignored_by_reserve() {
        TrendlineId::reserve(&TrendlineId::from("line-a"));
        assert!(!TrendlineId::generate().as_str().is_empty());
    }

    #[test]
    fn test_endpoint_access() {
        let mut line = Trendline::with_id(
            "1",
            TrendlinePoint::unplaced(1000, 100.0),
            TrendlinePoint::unplaced(2000, 110.0),
            DEFAULT_TRENDLINE_COLOR,
        );
        line.endpoint_mut(Endpoint::End).price = 120.0;
        assert_eq!(line.endpoint(Endpoint::End).price, 120.0);
        assert_eq!(line.endpoint(Endpoint::Start).timestamp, 1000);
    }

    #[test]
    fn test_slope_percent() {
        let line = Trendline::with_id(
            "1",
            TrendlinePoint::unplaced(0, 200.0),
            TrendlinePoint::unplaced(60, 190.0),
            DEFAULT_TRENDLINE_COLOR,
        );
        assert_eq!(line.slope_percent(), Some(-5.0));

        let flat_zero = Trendline::with_id(
            "2",
            TrendlinePoint::unplaced(0, 0.0),
            TrendlinePoint::unplaced(60, 1.0),
            DEFAULT_TRENDLINE_COLOR,
        );
        assert_eq!(flat_zero.slope_percent(), None);
    }
}
