//! Chart session: the single owner of editing state.
//!
//! Every input arrives as a [`Command`]. The session runs it through the
//! gesture machine, applies the resulting effects to the collection and
//! delivers the notifications to observers in the order the mutations
//! happened. Nothing here blocks or awaits.

use trendline_config::ChartConfig;
use trendline_core::Candle;

use crate::coords::{ChartArea, Viewport};
use crate::drawing::{
    Draft, GestureEffect, GestureMachine, RadiusHitTester, Trendline, TrendlineCollection,
    DEFAULT_HIT_TOLERANCE_PX, DEFAULT_TRENDLINE_COLOR,
};
use crate::events::{Command, EventBus, Notification};
use crate::persist::PersistenceBridge;
use crate::remote::{RemoteMirror, SyncOp};

/// Receives notifications after each command.
pub trait Observer {
    fn notify(&mut self, note: &Notification);
}

impl<F: FnMut(&Notification)> Observer for F {
    fn notify(&mut self, note: &Notification) {
        self(note)
    }
}

/// Geometry and interaction settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub width: f64,
    pub height: f64,
    pub hit_tolerance_px: f64,
    pub price_padding: f64,
    pub default_color: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            price_padding: 0.1,
            default_color: DEFAULT_TRENDLINE_COLOR.to_string(),
        }
    }
}

impl From<&ChartConfig> for SessionSettings {
    fn from(chart: &ChartConfig) -> Self {
        Self {
            width: chart.width,
            height: chart.height,
            hit_tolerance_px: chart.hit_tolerance_px,
            price_padding: chart.price_padding,
            default_color: chart.default_color.clone(),
        }
    }
}

pub struct Session {
    symbol: String,
    settings: SessionSettings,
    viewport: Viewport,
    candles: Vec<Candle>,
    collection: TrendlineCollection,
    gesture: GestureMachine,
    hits: RadiusHitTester,
    bus: EventBus,
    observers: Vec<Box<dyn Observer>>,
    mirror: Option<RemoteMirror>,
}

impl Session {
    /// Session for `symbol` with trendlines restored from `store`.
    ///
    /// The viewport has no scale until [`apply_data`](Self::apply_data) is
    /// called, so pointer commands are ignored until then.
    pub fn new(symbol: impl Into<String>, store: PersistenceBridge, settings: SessionSettings) -> Self {
        let viewport = Viewport::new(ChartArea::sized(settings.width, settings.height));
        let hits = RadiusHitTester::new(settings.hit_tolerance_px);
        Self {
            symbol: symbol.into(),
            settings,
            viewport,
            candles: Vec::new(),
            collection: TrendlineCollection::load(store),
            gesture: GestureMachine::new(),
            hits,
            bus: EventBus::new(),
            observers: Vec::new(),
            mirror: None,
        }
    }

    /// Mirror every mutation to the backend.
    pub fn with_mirror(mut self, mirror: RemoteMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn add_observer(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn trendlines(&self) -> &[Trendline] {
        self.collection.list()
    }

    pub fn selected(&self) -> Option<&Trendline> {
        self.collection.selected()
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    /// The line being drawn, for preview rendering.
    pub fn draft(&self) -> Option<&Draft> {
        self.gesture.draft()
    }

    /// Queue a command without running it.
    pub fn dispatch(&mut self, cmd: Command) {
        self.bus.dispatch(cmd);
    }

    /// Run one command and deliver its notifications.
    pub fn execute(&mut self, cmd: Command) {
        self.bus.dispatch(cmd);
        self.process_pending();
    }

    /// Run every queued command, then deliver notifications.
    pub fn process_pending(&mut self) {
        while let Some(cmd) = self.bus.next_command() {
            self.handle(cmd);
        }
        self.deliver();
    }

    /// Replace the price data and refit the viewport.
    ///
    /// An empty dataset keeps the previous one and returns `false`.
    pub fn apply_data(&mut self, symbol: &str, candles: Vec<Candle>) -> bool {
        if candles.is_empty() {
            log::warn!("no price data for {symbol}, keeping the last dataset");
            return false;
        }
        if !self.viewport.fit(&candles, self.settings.price_padding) {
            return false;
        }

        self.symbol = symbol.to_string();
        self.candles = candles;
        self.collection.refresh_pixel_hints(&self.viewport);
        log::info!("{} bars loaded for {}", self.candles.len(), self.symbol);

        self.bus.notify(Notification::DataUpdated {
            symbol: self.symbol.clone(),
            candles: self.candles.len(),
            last_close: self.last_close(),
        });
        self.deliver();
        true
    }

    fn handle(&mut self, cmd: Command) {
        let effects = match cmd {
            Command::StartDrawing => match self.gesture.start_drawing() {
                Ok(effects) => effects,
                Err(e) => {
                    log::warn!("{e}");
                    Vec::new()
                }
            },
            Command::CancelDrawing => self.gesture.cancel_drawing(),
            Command::ToggleDrawing => match self.gesture.toggle_drawing() {
                Ok(effects) => effects,
                Err(e) => {
                    log::warn!("{e}");
                    Vec::new()
                }
            },
            Command::Click(pixel) => {
                self.gesture
                    .click(pixel, &self.viewport, &self.hits, self.collection.list())
            }
            Command::PointerDown(pixel) => {
                self.gesture
                    .pointer_down(pixel, &self.viewport, &self.hits, self.collection.list())
            }
            Command::PointerMove(pixel) => {
                self.gesture
                    .pointer_move(pixel, &self.viewport, &self.hits, self.collection.list())
            }
            Command::PointerUp => self.gesture.pointer_up(),
            Command::Delete(id) => {
                if !self.collection.remove(&id) {
                    log::debug!("delete ignored: no trendline {id}");
                    return;
                }
                self.pull_collection_notes();
                self.mirror(SyncOp::Delete(id.clone()));
                self.gesture.forget(&id)
            }
            Command::ClearAll => {
                let mut effects = Vec::new();
                if let Some(target) = self.gesture.active_target().cloned() {
                    effects = self.gesture.forget(&target.trendline_id);
                }
                self.collection.clear();
                self.pull_collection_notes();
                self.mirror(SyncOp::Clear);
                effects
            }
            Command::Select(id) => {
                self.collection.select(id.as_ref());
                Vec::new()
            }
            Command::Resize { width, height } => {
                self.viewport.resize(width, height);
                self.collection.refresh_pixel_hints(&self.viewport);
                Vec::new()
            }
            Command::SwitchSymbol(_) | Command::Refresh | Command::Quit => {
                log::debug!("{cmd:?} is handled by the runner");
                Vec::new()
            }
        };

        for effect in effects {
            self.apply(effect);
        }
        self.pull_collection_notes();
    }

    fn apply(&mut self, effect: GestureEffect) {
        match effect {
            GestureEffect::DrawingStateChanged(drawing) => {
                self.bus.notify(Notification::DrawingStateChanged(drawing));
            }
            GestureEffect::HoverChanged(target) => {
                self.bus.notify(Notification::HoverChanged(target));
            }
            GestureEffect::Commit { start, end } => {
                let line = Trendline::new(start, end, self.settings.default_color.clone());
                let id = line.id.clone();
                self.mirror(SyncOp::Create(line.clone()));
                self.collection.add(line);
                self.collection.select(Some(&id));
            }
            GestureEffect::Select(id) => self.collection.select(Some(&id)),
            GestureEffect::MoveEndpoint { target, point } => {
                if !self
                    .collection
                    .update_endpoint_deferred(&target.trendline_id, target.endpoint, point)
                {
                    log::debug!("drag target {} no longer exists", target.trendline_id);
                }
            }
            GestureEffect::DragFinished(target) => {
                self.collection.flush();
                if let Some(line) = self.collection.get(&target.trendline_id).cloned() {
                    log::info!("trendline {} {} moved", line.id, target.endpoint.name());
                    self.mirror(SyncOp::Update(line));
                }
            }
        }
        self.pull_collection_notes();
    }

    fn pull_collection_notes(&mut self) {
        self.bus.notify_all(self.collection.take_notifications());
    }

    fn mirror(&self, op: SyncOp) {
        if let Some(mirror) = &self.mirror {
            mirror.send(op);
        }
    }

    fn deliver(&mut self) {
        for note in self.bus.drain_notifications() {
            log::trace!("notify {}", note.name());
            for observer in &mut self.observers {
                observer.notify(&note);
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("symbol", &self.symbol)
            .field("candles", &self.candles.len())
            .field("trendlines", &self.collection.len())
            .field("gesture", &self.gesture.state().name())
            .finish_non_exhaustive()
    }
}
