//! Interactive trendline editing on top of a price chart.
//!
//! Pointer input arrives as [`events::Command`]s at a [`session::Session`].
//! The session maps pixels to (timestamp, price) through the
//! [`coords::Viewport`], runs the two-click draw and endpoint-drag gestures in
//! [`drawing::GestureMachine`], keeps the [`drawing::TrendlineCollection`] in
//! step with its [`persist::PersistenceBridge`] and reports every change as an
//! [`events::Notification`].
//!
//! ```ignore
//! let mut session = Session::new("BTCUSDT", PersistenceBridge::in_memory(), SessionSettings::default());
//! session.apply_data("BTCUSDT", candles);
//!
//! session.execute(Command::StartDrawing);
//! session.execute(Command::Click(PixelPos::new(100.0, 400.0)));
//! session.execute(Command::Click(PixelPos::new(900.0, 120.0)));
//! assert_eq!(session.trendlines().len(), 1);
//! ```

pub mod coords;
pub mod display;
pub mod drawing;
pub mod events;
pub mod input;
pub mod persist;
pub mod remote;
pub mod runner;
pub mod session;

pub use coords::{ChartArea, CoordError, CoordinateMapper, DomainPoint, PixelPos, Viewport};
pub use drawing::{Trendline, TrendlineCollection, TrendlineId, TrendlinePoint};
pub use events::{Command, Notification};
pub use persist::PersistenceBridge;
pub use session::{Observer, Session, SessionSettings};
