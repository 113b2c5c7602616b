use chrono::{DateTime, Utc};

/// A notification emitted by a state container.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **ordered** per source via `revision`
/// - cheap to clone (they are fanned out to every subscriber)
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "auth.state.changed").
    fn event_type(&self) -> &'static str;

    /// Monotonic position of this event in its source's history.
    fn revision(&self) -> u64;

    /// When the change happened (wall clock).
    fn occurred_at(&self) -> DateTime<Utc>;
}
