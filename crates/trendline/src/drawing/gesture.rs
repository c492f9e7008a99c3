//! Pointer gesture state machine.
//!
//! The machine decides what a pointer event means (start a line, finish a
//! line, drag an endpoint, hover) and reports the outcome as a list of
//! [`GestureEffect`]s. It never touches the trendline collection itself; the
//! session applies the effects.

use thiserror::Error;

use crate::coords::{CoordinateMapper, PixelPos};

use super::hit_test::HitTester;
use super::types::{DragTarget, Trendline, TrendlineId, TrendlinePoint};

/// A trendline being drawn. `end` equals `start` until the second click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draft {
    pub start: TrendlinePoint,
    pub end: TrendlinePoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawPhase {
    AwaitingStart,
    AwaitingEnd { draft: Draft },
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is over an endpoint.
    Hovering(DragTarget),
    /// Placing the two points of a new trendline.
    Drawing(DrawPhase),
    /// Moving one endpoint of an existing trendline.
    Dragging(DragTarget),
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Hovering(_) => "hovering",
            GestureState::Drawing(DrawPhase::AwaitingStart) => "drawing (awaiting start)",
            GestureState::Drawing(DrawPhase::AwaitingEnd { .. }) => "drawing (awaiting end)",
            GestureState::Dragging(_) => "dragging",
        }
    }
}

/// Outcome of a gesture step, applied by the session in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    /// Drawing mode was entered (`true`) or left (`false`).
    DrawingStateChanged(bool),
    /// Second click landed: add this trendline to the collection and select it.
    Commit { start: TrendlinePoint, end: TrendlinePoint },
    /// Show this trendline's coordinates.
    Select(TrendlineId),
    /// Move a dragged endpoint. Notify, but do not persist yet.
    MoveEndpoint { target: DragTarget, point: TrendlinePoint },
    /// Drag released: persist the collection once.
    DragFinished(DragTarget),
    /// The endpoint under the pointer changed.
    HoverChanged(Option<DragTarget>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GestureError {
    #[error("cannot start drawing while an endpoint is being dragged")]
    DragInProgress,
}

/// Gesture state machine for drawing and editing trendlines.
#[derive(Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// The in-progress draft, if the first point has been placed.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            GestureState::Drawing(DrawPhase::AwaitingEnd { draft }) => Some(draft),
            _ => None,
        }
    }

    /// The endpoint under the pointer or being dragged.
    pub fn active_target(&self) -> Option<&DragTarget> {
        match &self.state {
            GestureState::Hovering(target) | GestureState::Dragging(target) => Some(target),
            _ => None,
        }
    }

    /// Enter drawing mode.
    ///
    /// While already drawing this restarts at the first point and discards any
    /// draft.
    pub fn start_drawing(&mut self) -> Result<Vec<GestureEffect>, GestureError> {
        let effects = match &self.state {
            GestureState::Dragging(_) => return Err(GestureError::DragInProgress),
            GestureState::Drawing(_) => Vec::new(),
            GestureState::Hovering(_) => vec![
                GestureEffect::HoverChanged(None),
                GestureEffect::DrawingStateChanged(true),
            ],
            GestureState::Idle => vec![GestureEffect::DrawingStateChanged(true)],
        };
        self.transition(GestureState::Drawing(DrawPhase::AwaitingStart));
        Ok(effects)
    }

    /// Leave drawing mode without committing anything.
    pub fn cancel_drawing(&mut self) -> Vec<GestureEffect> {
        if !self.is_drawing() {
            return Vec::new();
        }
        self.transition(GestureState::Idle);
        vec![GestureEffect::DrawingStateChanged(false)]
    }

    /// Start drawing when idle, cancel when drawing.
    pub fn toggle_drawing(&mut self) -> Result<Vec<GestureEffect>, GestureError> {
        if self.is_drawing() {
            Ok(self.cancel_drawing())
        } else {
            self.start_drawing()
        }
    }

    /// Handle a click (press and release without a drag).
    pub fn click(
        &mut self,
        pixel: PixelPos,
        mapper: &impl CoordinateMapper,
        hits: &impl HitTester,
        trendlines: &[Trendline],
    ) -> Vec<GestureEffect> {
        let Ok(domain) = mapper.pixel_to_domain(pixel) else {
            log::debug!("click at ({:.1}, {:.1}) ignored: no scale", pixel.x, pixel.y);
            return Vec::new();
        };
        let point = TrendlinePoint::new(domain, pixel);

        match &self.state {
            GestureState::Drawing(DrawPhase::AwaitingStart) => {
                self.transition(GestureState::Drawing(DrawPhase::AwaitingEnd {
                    draft: Draft { start: point, end: point },
                }));
                Vec::new()
            }
            GestureState::Drawing(DrawPhase::AwaitingEnd { draft }) => {
                let start = draft.start;
                self.transition(GestureState::Idle);
                vec![
                    GestureEffect::Commit { start, end: point },
                    GestureEffect::DrawingStateChanged(false),
                ]
            }
            GestureState::Idle | GestureState::Hovering(_) => hits
                .hit(pixel, trendlines)
                .map(|target| vec![GestureEffect::Select(target.trendline_id)])
                .unwrap_or_default(),
            GestureState::Dragging(_) => Vec::new(),
        }
    }

    /// Handle a pointer press. Starts a drag when an endpoint is hit.
    pub fn pointer_down(
        &mut self,
        pixel: PixelPos,
        mapper: &impl CoordinateMapper,
        hits: &impl HitTester,
        trendlines: &[Trendline],
    ) -> Vec<GestureEffect> {
        if !matches!(self.state, GestureState::Idle | GestureState::Hovering(_)) {
            return Vec::new();
        }
        if mapper.pixel_to_domain(pixel).is_err() {
            return Vec::new();
        }
        let Some(target) = hits.hit(pixel, trendlines) else {
            return Vec::new();
        };

        let id = target.trendline_id.clone();
        self.transition(GestureState::Dragging(target));
        vec![GestureEffect::Select(id)]
    }

    /// Handle pointer movement: move the dragged endpoint, or update hover.
    pub fn pointer_move(
        &mut self,
        pixel: PixelPos,
        mapper: &impl CoordinateMapper,
        hits: &impl HitTester,
        trendlines: &[Trendline],
    ) -> Vec<GestureEffect> {
        let Ok(domain) = mapper.pixel_to_domain(pixel) else {
            return Vec::new();
        };

        match &self.state {
            GestureState::Dragging(target) => vec![GestureEffect::MoveEndpoint {
                target: target.clone(),
                point: TrendlinePoint::new(domain, pixel),
            }],
            GestureState::Idle | GestureState::Hovering(_) => {
                let hovered = hits.hit(pixel, trendlines);
                if self.active_target() == hovered.as_ref() {
                    return Vec::new();
                }
                let next = match &hovered {
                    Some(target) => GestureState::Hovering(target.clone()),
                    None => GestureState::Idle,
                };
                self.transition(next);
                vec![GestureEffect::HoverChanged(hovered)]
            }
            GestureState::Drawing(_) => Vec::new(),
        }
    }

    /// Handle a pointer release. Ends a drag.
    pub fn pointer_up(&mut self) -> Vec<GestureEffect> {
        let GestureState::Dragging(target) = &self.state else {
            return Vec::new();
        };
        let target = target.clone();
        self.transition(GestureState::Idle);
        vec![GestureEffect::DragFinished(target)]
    }

    /// Drop hover/drag state that refers to a trendline that no longer exists.
    pub fn forget(&mut self, id: &TrendlineId) -> Vec<GestureEffect> {
        let refers = self
            .active_target()
            .is_some_and(|target| &target.trendline_id == id);
        if !refers {
            return Vec::new();
        }
        let was_hovering = matches!(self.state, GestureState::Hovering(_));
        self.transition(GestureState::Idle);
        if was_hovering {
            vec![GestureEffect::HoverChanged(None)]
        } else {
            Vec::new()
        }
    }

    fn transition(&mut self, next: GestureState) {
        if self.state.name() != next.name() {
            log::debug!("gesture: {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }
}
