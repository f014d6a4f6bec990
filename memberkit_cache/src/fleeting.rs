//! A value that is only valid for a limited time.

use std::time::{Duration, Instant};

/// Absolute deadline for a time-to-live measured from now.
///
/// Returns `None` when the deadline is not representable (e.g. `Duration::MAX`),
/// which callers treat as "never expires".
pub(crate) fn deadline_after(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

/// A value together with the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct FleetingValue<T> {
    value: Option<T>,
    valid_until: Option<Instant>,
    expired: bool,
}

impl<T> FleetingValue<T> {
    /// An empty, already expired value.
    pub fn empty() -> Self {
        FleetingValue {
            value: None,
            valid_until: None,
            expired: true,
        }
    }

    pub fn new(value: T, ttl: Duration) -> Self {
        let mut fleeting = FleetingValue::empty();
        fleeting.set(value, ttl);
        fleeting
    }

    /// Replace the value and restart its lifetime.
    pub fn set(&mut self, value: T, ttl: Duration) {
        self.value = Some(value);
        self.valid_until = deadline_after(ttl);
        self.expired = false;
    }

    /// Drop the value; the slot reads as expired until the next `set`.
    pub fn clear(&mut self) {
        self.value = None;
        self.expired = true;
    }

    pub fn is_valid(&self) -> bool {
        if self.expired {
            return false;
        }
        match self.valid_until {
            Some(deadline) => Instant::now() < deadline,
            None => true,
        }
    }

    /// The value, if it is still valid.
    pub fn get(&self) -> Option<&T> {
        if self.is_valid() {
            self.value.as_ref()
        } else {
            None
        }
    }
}

impl<T> Default for FleetingValue<T> {
    fn default() -> Self {
        FleetingValue::empty()
    }
}
