//! End-to-end editing sessions driven through commands.

use std::cell::RefCell;
use std::rc::Rc;

use trendline::coords::{CoordinateMapper, PixelPos, ROUND_TRIP_EPSILON_PX};
use trendline::drawing::{DragTarget, Endpoint, Trendline, TrendlineCollection, TrendlineId, TrendlinePoint};
use trendline::persist::{FileBackend, MemoryBackend, PersistenceBridge, DEFAULT_STORAGE_KEY};
use trendline::{Command, Notification, Session, SessionSettings};
use trendline_core::Candle;

fn bars() -> Vec<Candle> {
    (0..100)
        .map(|i| {
            let close = 43_000.0 + (i % 20) as f64 * 15.0;
            Candle::new(1_700_000_000 + i * 300, close, close + 20.0, close - 20.0, close, 5.0)
        })
        .collect()
}

struct Harness {
    session: Session,
    backend: MemoryBackend,
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl Harness {
    fn new() -> Self {
        let backend = MemoryBackend::new();
        let store = PersistenceBridge::new(backend.clone(), DEFAULT_STORAGE_KEY);
        let mut session = Session::new("BTCUSDT", store, SessionSettings::default());
        assert!(session.apply_data("BTCUSDT", bars()));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.add_observer(move |note: &Notification| sink.borrow_mut().push(note.clone()));
        Self { session, backend, seen }
    }

    fn draw(&mut self, from: (f64, f64), to: (f64, f64)) -> Trendline {
        self.session.execute(Command::StartDrawing);
        self.session.execute(Command::Click(from.into()));
        self.session.execute(Command::Click(to.into()));
        self.session.trendlines().last().cloned().unwrap()
    }

    fn count(&self, name: &str) -> usize {
        self.seen.borrow().iter().filter(|n| n.name() == name).count()
    }
}

#[test]
fn test_pixel_round_trip_inside_viewport() {
    let harness = Harness::new();
    let viewport = harness.session.viewport();
    let area = viewport.area();

    for xi in 0..=12 {
        for yi in 0..=6 {
            let pixel = PixelPos::new(area.left + area.width * xi as f64 / 12.0, area.top + area.height * yi as f64 / 6.0);
            let domain = viewport.pixel_to_domain(pixel).unwrap();
            let back = viewport.domain_to_pixel(domain).unwrap();
            assert!(
                pixel.distance_to(back) <= ROUND_TRIP_EPSILON_PX,
                "{pixel:?} came back as {back:?}"
            );
        }
    }
}

#[test]
fn test_two_clicks_commit_one_trendline() {
    let mut harness = Harness::new();
    let p1 = PixelPos::new(150.0, 420.0);
    let p2 = PixelPos::new(1050.0, 130.0);
    let expected_start = harness.session.viewport().pixel_to_domain(p1).unwrap();
    let expected_end = harness.session.viewport().pixel_to_domain(p2).unwrap();

    let line = harness.draw((p1.x, p1.y), (p2.x, p2.y));

    assert_eq!(harness.session.trendlines().len(), 1);
    assert_eq!(line.start.domain(), expected_start);
    assert_eq!(line.end.domain(), expected_end);
    assert_eq!(line.color, "#2962FF");
    assert_eq!(harness.session.selected(), Some(&line));
    assert!(!harness.session.gesture().is_drawing());
    assert_eq!(harness.count("trendlines-changed"), 1);
}

#[test]
fn test_cancel_after_first_click_commits_nothing() {
    let mut harness = Harness::new();
    harness.session.execute(Command::StartDrawing);
    harness.session.execute(Command::Click(PixelPos::new(200.0, 200.0)));
    assert!(harness.session.draft().is_some());

    harness.session.execute(Command::CancelDrawing);

    assert!(harness.session.trendlines().is_empty());
    assert!(harness.session.draft().is_none());
    assert!(!harness.session.gesture().is_drawing());
    assert_eq!(harness.backend.writes(), 0);
    assert_eq!(
        harness.seen.borrow().as_slice(),
        &[Notification::DrawingStateChanged(true), Notification::DrawingStateChanged(false)]
    );
}

#[test]
fn test_drag_notifies_per_move_and_persists_once() {
    let mut harness = Harness::new();
    let line = harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.seen.borrow_mut().clear();
    let writes_before = harness.backend.writes();

    harness.session.execute(Command::PointerDown(PixelPos::new(801.0, 199.0)));
    assert!(harness.session.gesture().is_dragging());

    let moves = 7;
    for i in 1..=moves {
        harness.session.execute(Command::PointerMove(PixelPos::new(800.0 + i as f64 * 20.0, 200.0 - i as f64 * 10.0)));
    }
    assert_eq!(harness.count("trendlines-changed"), moves);
    assert_eq!(harness.backend.writes(), writes_before);

    harness.session.execute(Command::PointerUp);
    assert!(!harness.session.gesture().is_dragging());
    assert_eq!(harness.backend.writes(), writes_before + 1);
    assert_eq!(harness.count("trendlines-changed"), moves);

    let moved = harness.session.trendlines()[0].clone();
    assert_eq!(moved.id, line.id);
    assert_eq!(moved.start, line.start);
    assert_eq!(moved.end.pixel(), PixelPos::new(940.0, 130.0));

    let stored = PersistenceBridge::new(harness.backend.clone(), DEFAULT_STORAGE_KEY).load();
    assert_eq!(stored[0].end.domain(), moved.end.domain());
}

#[test]
fn test_pointer_down_without_hit_does_nothing() {
    let mut harness = Harness::new();
    harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.seen.borrow_mut().clear();

    harness.session.execute(Command::PointerDown(PixelPos::new(500.0, 500.0)));
    harness.session.execute(Command::PointerMove(PixelPos::new(510.0, 510.0)));
    harness.session.execute(Command::PointerUp);

    assert!(!harness.session.gesture().is_dragging());
    assert!(harness.seen.borrow().is_empty());
}

#[test]
fn test_hover_reports_target_changes_only() {
    let mut harness = Harness::new();
    let line = harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.seen.borrow_mut().clear();

    harness.session.execute(Command::PointerMove(PixelPos::new(203.0, 401.0)));
    harness.session.execute(Command::PointerMove(PixelPos::new(201.0, 402.0)));
    harness.session.execute(Command::PointerMove(PixelPos::new(600.0, 600.0)));

    let target = DragTarget::new(line.id.clone(), Endpoint::Start);
    assert_eq!(
        harness.seen.borrow().as_slice(),
        &[Notification::HoverChanged(Some(target)), Notification::HoverChanged(None)]
    );
}

#[test]
fn test_delete_during_drag_ends_the_drag() {
    let mut harness = Harness::new();
    let line = harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.session.execute(Command::PointerDown(PixelPos::new(200.0, 400.0)));
    assert!(harness.session.gesture().is_dragging());

    harness.session.execute(Command::Delete(line.id.clone()));
    assert!(harness.session.trendlines().is_empty());
    assert!(harness.session.selected().is_none());
    assert!(!harness.session.gesture().is_dragging());

    let writes = harness.backend.writes();
    harness.session.execute(Command::PointerUp);
    assert_eq!(harness.backend.writes(), writes);
}

#[test]
fn test_start_drawing_rejected_while_dragging() {
    let mut harness = Harness::new();
    harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.session.execute(Command::PointerDown(PixelPos::new(800.0, 200.0)));

    harness.session.execute(Command::StartDrawing);
    assert!(harness.session.gesture().is_dragging());
    assert!(!harness.session.gesture().is_drawing());
}

#[test]
fn test_clear_all_empties_collection_and_store() {
    let mut harness = Harness::new();
    harness.draw((200.0, 400.0), (800.0, 200.0));
    harness.draw((300.0, 300.0), (900.0, 100.0));
    assert_eq!(harness.session.trendlines().len(), 2);

    harness.session.execute(Command::ClearAll);

    assert!(harness.session.trendlines().is_empty());
    assert!(harness.session.selected().is_none());
    assert!(harness.backend.raw(DEFAULT_STORAGE_KEY).is_none());
    let last = harness.seen.borrow().last().cloned();
    assert_eq!(last, Some(Notification::TrendlinesChanged(Vec::new())));
}

#[test]
fn test_remove_missing_id_leaves_everything_unchanged() {
    let backend = MemoryBackend::new();
    let mut lines = TrendlineCollection::new(PersistenceBridge::new(backend.clone(), DEFAULT_STORAGE_KEY));
    lines.add(Trendline::with_id(
        "1",
        TrendlinePoint::unplaced(1000, 100.0),
        TrendlinePoint::unplaced(2000, 110.0),
        "#2962FF",
    ));
    lines.take_notifications();
    let before = lines.list().to_vec();
    let stored = backend.raw(DEFAULT_STORAGE_KEY);

    assert!(!lines.remove(&TrendlineId::from("does-not-exist")));
    assert_eq!(lines.list(), before.as_slice());
    assert_eq!(backend.raw(DEFAULT_STORAGE_KEY), stored);
    assert!(lines.take_notifications().is_empty());
}

#[test]
fn test_save_then_load_resets_pixel_hints() {
    let store = PersistenceBridge::in_memory();
    let original = vec![
        Trendline::with_id(
            "1700000000000",
            TrendlinePoint { timestamp: 1_700_000_000, price: 43_000.5, pixel_x: 12.0, pixel_y: 34.0 },
            TrendlinePoint { timestamp: 1_700_003_000, price: 43_500.25, pixel_x: 56.0, pixel_y: 78.0 },
            "#FF5722",
        ),
        Trendline::with_id("2", TrendlinePoint::unplaced(5, 1.0), TrendlinePoint::unplaced(6, 2.0), "#2962FF"),
    ];

    store.save(&original).unwrap();
    let loaded = store.load();

    assert_eq!(loaded.len(), original.len());
    for (got, want) in loaded.iter().zip(&original) {
        assert_eq!(got.id, want.id);
        assert_eq!(got.start.domain(), want.start.domain());
        assert_eq!(got.end.domain(), want.end.domain());
        assert_eq!(got.color, want.color);
        assert_eq!(got.start.pixel(), PixelPos::new(0.0, 0.0));
        assert_eq!(got.end.pixel(), PixelPos::new(0.0, 0.0));
    }
}

#[test]
fn test_add_update_remove_scenario() {
    let backend = MemoryBackend::new();
    let store = PersistenceBridge::new(backend.clone(), DEFAULT_STORAGE_KEY);
    let mut lines = TrendlineCollection::new(store);
    let id = TrendlineId::from("1");

    lines.add(Trendline::with_id(
        id.clone(),
        TrendlinePoint::unplaced(1000, 100.0),
        TrendlinePoint::unplaced(1000, 100.0),
        "#2962FF",
    ));
    lines.update_endpoint(&id, Endpoint::End, TrendlinePoint::unplaced(2000, 120.0));
    assert_eq!(lines.get(&id).map(|t| t.end.price), Some(120.0));
    assert_eq!(lines.get(&id).map(|t| t.end.timestamp), Some(2000));

    assert!(lines.remove(&id));
    assert!(lines.is_empty());
    assert!(PersistenceBridge::new(backend, DEFAULT_STORAGE_KEY).load().is_empty());
    assert_eq!(lines.take_notifications().len(), 3);
}

#[test]
fn test_trendlines_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let open = || PersistenceBridge::new(FileBackend::new(dir.path()), DEFAULT_STORAGE_KEY);

    let first_id = {
        let mut session = Session::new("BTCUSDT", open(), SessionSettings::default());
        session.apply_data("BTCUSDT", bars());
        session.execute(Command::StartDrawing);
        session.execute(Command::Click(PixelPos::new(100.0, 300.0)));
        session.execute(Command::Click(PixelPos::new(700.0, 150.0)));
        session.trendlines()[0].id.clone()
    };

    let mut session = Session::new("BTCUSDT", open(), SessionSettings::default());
    assert_eq!(session.trendlines().len(), 1);
    assert_eq!(session.trendlines()[0].id, first_id);

    // Hints are recomputed once data arrives, so the restored line is draggable.
    session.apply_data("BTCUSDT", bars());
    let start = session.trendlines()[0].start.pixel();
    assert!(start.distance_to(PixelPos::new(100.0, 300.0)) < 1.0);

    session.execute(Command::StartDrawing);
    session.execute(Command::Click(PixelPos::new(200.0, 200.0)));
    session.execute(Command::Click(PixelPos::new(300.0, 250.0)));
    assert_eq!(session.trendlines().len(), 2);
    assert_ne!(session.trendlines()[1].id, first_id);
}

#[test]
fn test_corrupt_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tradingTrendlines.json"), "{not json").unwrap();

    let session = Session::new(
        "BTCUSDT",
        PersistenceBridge::new(FileBackend::new(dir.path()), DEFAULT_STORAGE_KEY),
        SessionSettings::default(),
    );
    assert!(session.trendlines().is_empty());
}
