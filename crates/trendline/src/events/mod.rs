//! Commands in, notifications out.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{Command, Notification};
