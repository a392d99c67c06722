//! Wall-clock port.

use chrono::{DateTime, Utc};

/// Source of the current time. Injected so trigger boundaries are testable.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}
