//! Event bus for queuing commands and notifications.
//!
//! The [`EventBus`] collects commands from the input boundary and the
//! notifications produced while executing them, and hands both out in FIFO
//! order.

use std::collections::VecDeque;

use super::types::{Command, Notification};

/// Queues commands and notifications for processing.
///
/// # Usage Pattern
///
/// ```ignore
/// let mut bus = EventBus::new();
///
/// // At the input boundary
/// bus.dispatch(Command::StartDrawing);
///
/// // In the session
/// while let Some(cmd) = bus.next_command() {
///     session.execute(cmd);
/// }
///
/// // Deliver what happened
/// for note in bus.drain_notifications() {
///     observer.notify(&note);
/// }
/// ```
#[derive(Debug, Default)]
pub struct EventBus {
    commands: VecDeque<Command>,
    notifications: VecDeque<Notification>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command.
    pub fn dispatch(&mut self, cmd: Command) {
        self.commands.push_back(cmd);
    }

    /// Queue a notification.
    pub fn notify(&mut self, note: Notification) {
        self.notifications.push_back(note);
    }

    /// Queue several notifications at once.
    pub fn notify_all(&mut self, notes: impl IntoIterator<Item = Notification>) {
        self.notifications.extend(notes);
    }

    /// Remove and return the oldest queued command.
    pub fn next_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    /// Drain all pending notifications.
    pub fn drain_notifications(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.notifications.drain(..)
    }

}
