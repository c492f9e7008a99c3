//! Command and notification type definitions.
//!
//! - [`Command`] - Requests from the rendering/input boundary
//! - [`Notification`] - State changes reported to observers

use crate::coords::PixelPos;
use crate::drawing::{DragTarget, Trendline, TrendlineId};

/// Explicit commands accepted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Enter drawing mode (restarts if already drawing).
    StartDrawing,
    /// Leave drawing mode, discarding any draft.
    CancelDrawing,
    /// Start drawing when idle, cancel when drawing.
    ToggleDrawing,

    /// Click at a container pixel position.
    Click(PixelPos),
    /// Pointer button pressed.
    PointerDown(PixelPos),
    /// Pointer moved.
    PointerMove(PixelPos),
    /// Pointer button released.
    PointerUp,

    /// Delete one trendline.
    Delete(TrendlineId),
    /// Delete every trendline and the stored copy.
    ClearAll,
    /// Show (or hide, with `None`) a trendline's coordinates.
    Select(Option<TrendlineId>),

    /// Plot area was resized.
    Resize { width: f64, height: f64 },
    /// Load another trading pair.
    SwitchSymbol(String),
    /// Fetch fresh price data now.
    Refresh,
    /// Shut down.
    Quit,
}

/// State changes delivered to observers in mutation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The collection changed; carries the full list in insertion order.
    TrendlinesChanged(Vec<Trendline>),
    /// The selected trendline changed.
    SelectionChanged(Option<Trendline>),
    /// Drawing mode was entered or left.
    DrawingStateChanged(bool),
    /// The endpoint under the pointer changed (cursor hint).
    HoverChanged(Option<DragTarget>),
    /// New price data was applied.
    DataUpdated {
        symbol: String,
        candles: usize,
        last_close: Option<f64>,
    },
}

impl Notification {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Notification::TrendlinesChanged(_) => "trendlines-changed",
            Notification::SelectionChanged(_) => "selection-changed",
            Notification::DrawingStateChanged(_) => "drawing-state-changed",
            Notification::HoverChanged(_) => "hover-changed",
            Notification::DataUpdated { .. } => "data-updated",
        }
    }
}
