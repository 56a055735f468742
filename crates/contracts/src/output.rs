//! EventOutput trait - fire-and-forget event sink

use crate::Event;

/// An output consumes events without reporting back to the caller
///
/// Outcomes are observable through logs, metrics and traces only.
pub trait EventOutput: Send + Sync {
    /// Output name (used for logging)
    fn name(&self) -> &str;

    /// Schedule delivery of `event`; never blocks, never fails
    fn send(&self, event: Option<Event>);
}
