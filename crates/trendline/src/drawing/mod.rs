//! Trendline drawing: types, hit testing, the gesture machine and the collection.

mod collection;
mod gesture;
mod types;

pub use collection::TrendlineCollection;
pub use gesture::{Draft, DrawPhase, GestureEffect, GestureError, GestureMachine, GestureState};
pub use hit_test::{HitTester, RadiusHitTester, DEFAULT_HIT_TOLERANCE_PX};
pub use types::{DragTarget, Endpoint, Trendline, TrendlineId, TrendlinePoint, DEFAULT_TRENDLINE_COLOR};
