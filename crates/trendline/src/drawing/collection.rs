//! In-memory trendline collection with write-through persistence.

use crate::coords::CoordinateMapper;
use crate::events::Notification;
use crate::persist::PersistenceBridge;

use super::types::{Endpoint, Trendline, TrendlineId, TrendlinePoint};

/// Ordered set of committed trendlines.
///
/// Every mutation is written through to the [`PersistenceBridge`] and queues a
/// [`Notification::TrendlinesChanged`] carrying the full list. Drags use
/// [`update_endpoint_deferred`](Self::update_endpoint_deferred), which
/// notifies per move and leaves the write to [`flush`](Self::flush).
#[derive(Debug)]
pub struct TrendlineCollection {
    trendlines: Vec<Trendline>,
    selected: Option<TrendlineId>,
    store: PersistenceBridge,
    outbox: Vec<Notification>,
}

impl TrendlineCollection {
    /// Empty collection; nothing is read from `store`.
    pub fn new(store: PersistenceBridge) -> Self {
        Self {
            trendlines: Vec::new(),
            selected: None,
            store,
            outbox: Vec::new(),
        }
    }

    /// Collection rehydrated from `store`.
    pub fn load(store: PersistenceBridge) -> Self {
        let trendlines = store.load();
        if !trendlines.is_empty() {
            log::info!("restored {} trendlines", trendlines.len());
        }
        Self {
            trendlines,
            ..Self::new(store)
        }
    }

    /// All trendlines in insertion order.
    pub fn list(&self) -> &[Trendline] {
        &self.trendlines
    }

    pub fn get(&self, id: &TrendlineId) -> Option<&Trendline> {
        self.trendlines.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.trendlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trendlines.is_empty()
    }

    pub fn add(&mut self, trendline: Trendline) {
        log::info!(
            "trendline {} added: ({}, {:.2}) -> ({}, {:.2})",
            trendline.id,
            trendline.start.timestamp,
            trendline.start.price,
            trendline.end.timestamp,
            trendline.end.price
        );
        self.trendlines.push(trendline);
        self.persist();
        self.notify_changed();
    }

    /// Move one endpoint and persist. Unknown ids are ignored.
    pub fn update_endpoint(&mut self, id: &TrendlineId, endpoint: Endpoint, point: TrendlinePoint) {
        if self.set_endpoint(id, endpoint, point) {
            self.persist();
            self.notify_changed();
        }
    }

    /// Move one endpoint and notify without persisting.
    ///
    /// Returns `false` for unknown ids. Call [`flush`](Self::flush) when the
    /// drag ends.
    pub fn update_endpoint_deferred(&mut self, id: &TrendlineId, endpoint: Endpoint, point: TrendlinePoint) -> bool {
        let found = self.set_endpoint(id, endpoint, point);
        if found {
            self.notify_changed();
        }
        found
    }

    /// Write the current list to storage.
    pub fn flush(&mut self) {
        self.persist();
    }

    /// Remove a trendline. Returns `false`, with no side effects, for an unknown id.
    pub fn remove(&mut self, id: &TrendlineId) -> bool {
        let Some(index) = self.trendlines.iter().position(|t| &t.id == id) else {
            return false;
        };
        self.trendlines.remove(index);
        log::info!("trendline {id} deleted");

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.outbox.push(Notification::SelectionChanged(None));
        }
        self.persist();
        self.notify_changed();
        true
    }

    /// Remove every trendline and the stored entry.
    pub fn clear(&mut self) {
        let count = self.trendlines.len();
        self.trendlines.clear();
        if self.selected.take().is_some() {
            self.outbox.push(Notification::SelectionChanged(None));
        }
        if let Err(e) = self.store.clear() {
            log::error!("failed to clear stored trendlines: {e}");
        }
        log::info!("cleared {count} trendlines");
        self.notify_changed();
    }

    /// Select a trendline for the coordinate display, or clear the selection.
    ///
    /// Unknown ids clear the selection. Notifies only on change.
    pub fn select(&mut self, id: Option<&TrendlineId>) {
        let next = id.filter(|id| self.get(id).is_some()).cloned();
        if next == self.selected {
            return;
        }
        self.selected = next;
        let selected = self.selected().cloned();
        self.outbox.push(Notification::SelectionChanged(selected));
    }

    pub fn selected(&self) -> Option<&Trendline> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Recompute cached pixel hints for the current viewport.
    ///
    /// Points that cannot be mapped keep their previous hints.
    pub fn refresh_pixel_hints(&mut self, mapper: &impl CoordinateMapper) {
        for line in &mut self.trendlines {
            for point in [&mut line.start, &mut line.end] {
                if let Ok(pixel) = mapper.domain_to_pixel(point.domain()) {
                    point.pixel_x = pixel.x;
                    point.pixel_y = pixel.y;
                }
            }
        }
    }

    /// Take queued notifications in mutation order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    fn set_endpoint(&mut self, id: &TrendlineId, endpoint: Endpoint, point: TrendlinePoint) -> bool {
        match self.trendlines.iter_mut().find(|t| &t.id == id) {
            Some(line) => {
                *line.endpoint_mut(endpoint) = point;
                true
            }
            None => false,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.trendlines) {
            log::error!("failed to save trendlines: {e}");
        }
    }

    fn notify_changed(&mut self) {
        self.outbox
            .push(Notification::TrendlinesChanged(self.trendlines.clone()));
    }
}
