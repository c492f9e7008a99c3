//! Pixel ↔ domain coordinate mapping.
//!
//! Two coordinate spaces meet here:
//!
//! - **Pixel coordinates** ([`PixelPos`]): positions in the chart container,
//!   origin at the top-left, Y increasing downward.
//! - **Domain coordinates** ([`DomainPoint`]): whole-second timestamp and price.
//!
//! The time axis is scaled in display milliseconds; whole seconds are used
//! everywhere outside this module. Converting a pixel back to the domain floors
//! to whole seconds.
//!
//! A [`Viewport`] has no scale until it has been fitted to data. Until then
//! every conversion fails with [`CoordError::NoScale`].

use thiserror::Error;
use trendline_core::Candle;

/// Tolerance, in pixels, for a pixel → domain → pixel round trip.
pub const ROUND_TRIP_EPSILON_PX: f64 = 0.5;

/// Smallest time span per pixel. Flooring to whole seconds then moves a
/// point by at most half a pixel.
const MIN_SECS_PER_PX: f64 = 2.0;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordError {
    #[error("no valid scale: chart data has not been loaded")]
    NoScale,
    #[error("coordinate is not a finite number")]
    NonFinite,
}

/// Pixel position relative to the chart container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: PixelPos) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance (cheaper than `distance_to` when only comparing).
    #[must_use]
    pub fn distance_squared_to(self, other: PixelPos) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for PixelPos {
    fn from(pos: (f64, f64)) -> Self {
        Self::new(pos.0, pos.1)
    }
}

/// A point in chart data space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomainPoint {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub price: f64,
}

impl DomainPoint {
    #[must_use]
    pub const fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Pixel rectangle of the plot area inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ChartArea {
    /// Create a plot area. Width and height are clamped to at least one pixel.
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Plot area anchored at the container origin.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Linear axis range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
}

impl AxisScale {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn is_usable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.span() > 0.0
    }
}

/// Time (display milliseconds) and price ranges mapped onto the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewScale {
    pub time_ms: AxisScale,
    pub price: AxisScale,
}

/// The "pixel ↔ domain" capability the editing engine consumes.
pub trait CoordinateMapper {
    fn pixel_to_domain(&self, pixel: PixelPos) -> Result<DomainPoint, CoordError>;
    fn domain_to_pixel(&self, point: DomainPoint) -> Result<PixelPos, CoordError>;
}

/// Chart viewport: plot area plus the scale fitted to the loaded data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    area: ChartArea,
    scale: Option<ViewScale>,
}

impl Viewport {
    /// Viewport without a scale; conversions fail until [`fit`](Self::fit).
    #[must_use]
    pub fn new(area: ChartArea) -> Self {
        Self { area, scale: None }
    }

    /// Viewport with an explicit scale.
    #[must_use]
    pub fn with_scale(area: ChartArea, scale: ViewScale) -> Self {
        Self {
            area,
            scale: Some(scale),
        }
    }

    #[must_use]
    pub fn area(&self) -> ChartArea {
        self.area
    }

    #[must_use]
    pub fn scale(&self) -> Option<ViewScale> {
        self.scale
    }

    #[must_use]
    pub fn has_scale(&self) -> bool {
        self.scale.is_some()
    }

    /// Fit the scale to `candles`.
    ///
    /// The time axis spans the first to last bar; the price axis spans the
    /// close range padded by `padding` (fraction of the range) on each side,
    /// with the lower bound clamped at zero. A time span shorter than
    /// two seconds per pixel is widened around its midpoint. Returns `false`
    /// and leaves the scale untouched when `candles` is empty.
    pub fn fit(&mut self, candles: &[Candle], padding: f64) -> bool {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return false;
        };
        let Some((low, high)) = trendline_core::close_range(candles) else {
            return false;
        };

        let start = first.timestamp.min(last.timestamp);
        let end = first.timestamp.max(last.timestamp);

        let (mut low, mut high) = (low, high);
        if high - low <= 0.0 {
            let widen = (low.abs() * 0.01).max(1.0);
            low -= widen;
            high += widen;
        }
        let pad = (high - low) * padding.max(0.0);

        self.scale = Some(ViewScale {
            time_ms: self.widened_time(AxisScale::new(start as f64 * 1000.0, end as f64 * 1000.0)),
            price: AxisScale::new((low - pad).max(0.0), high + pad),
        });
        true
    }

    /// Change the plot size, keeping the scale.
    ///
    /// The time axis is widened when the new width would put fewer than two
    /// seconds under each pixel.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.area = ChartArea::new(self.area.left, self.area.top, width, height);
        if let Some(mut scale) = self.scale {
            scale.time_ms = self.widened_time(scale.time_ms);
            self.scale = Some(scale);
        }
    }

    fn widened_time(&self, time_ms: AxisScale) -> AxisScale {
        let min_span = self.area.width * MIN_SECS_PER_PX * 1000.0;
        if time_ms.span() >= min_span {
            return time_ms;
        }
        let mid = (time_ms.min + time_ms.max) / 2.0;
        AxisScale::new(mid - min_span / 2.0, mid + min_span / 2.0)
    }

    fn usable_scale(&self) -> Result<ViewScale, CoordError> {
        match self.scale {
            Some(scale) if scale.time_ms.is_usable() && scale.price.is_usable() => Ok(scale),
            _ => Err(CoordError::NoScale),
        }
    }
}

impl CoordinateMapper for Viewport {
    fn pixel_to_domain(&self, pixel: PixelPos) -> Result<DomainPoint, CoordError> {
        let scale = self.usable_scale()?;
        if !pixel.is_finite() {
            return Err(CoordError::NonFinite);
        }

        let fx = (pixel.x - self.area.left) / self.area.width;
        let fy = (pixel.y - self.area.top) / self.area.height;

        let ms = scale.time_ms.min + fx * scale.time_ms.span();
        let price = scale.price.max - fy * scale.price.span();

        Ok(DomainPoint {
            timestamp: (ms / 1000.0).floor() as i64,
            price,
        })
    }

    fn domain_to_pixel(&self, point: DomainPoint) -> Result<PixelPos, CoordError> {
        let scale = self.usable_scale()?;
        if !point.price.is_finite() {
            return Err(CoordError::NonFinite);
        }

        let ms = point.timestamp as f64 * 1000.0;
        let fx = (ms - scale.time_ms.min) / scale.time_ms.span();
        let fy = (scale.price.max - point.price) / scale.price.span();

        Ok(PixelPos {
            x: self.area.left + fx * self.area.width,
            y: self.area.top + fy * self.area.height,
        })
    }
}
