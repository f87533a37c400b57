//! Source of "now" for overdue derivation.

use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

/// Supplies the current wall-clock instant.
///
/// Due dates are entered without an offset, so comparisons happen in local
/// wall-clock time.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> PrimitiveDateTime;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|err| {
            debug!(%err, "local offset unavailable, falling back to UTC");
            OffsetDateTime::now_utc()
        });
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub PrimitiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> PrimitiveDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn fixed_clock_reports_its_instant() {
        let clock = FixedClock(datetime!(2025-06-01 12:00));
        assert_eq!(clock.now(), datetime!(2025-06-01 12:00));
        assert_eq!((&clock).now(), datetime!(2025-06-01 12:00));
    }
}
