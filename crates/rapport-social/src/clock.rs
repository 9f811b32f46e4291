//! Timestamp source for new messages.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SubsecRound, Utc};

/// Hands out creation times that never go backwards, even if the system
/// clock does. Precision is one microsecond, matching what the store keeps.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose first reading is no earlier than `floor`.
    pub fn starting_at(floor: DateTime<Utc>) -> Self {
        Self {
            last: Mutex::new(Some(floor)),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Hand the next reading to `f` and keep the clock locked until it
    /// returns, so whatever `f` persists lands in timestamp order. The reading
    /// only counts as used if `f` succeeds.
    pub fn stamp<T, E>(&self, f: impl FnOnce(DateTime<Utc>) -> Result<T, E>) -> Result<T, E> {
        let mut last = self.lock();
        let next = next_reading(*last, Utc::now());
        let out = f(next)?;
        *last = Some(next);
        Ok(out)
    }

    fn observe(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let mut last = self.lock();
        let next = next_reading(*last, wall);
        *last = Some(next);
        next
    }

    fn lock(&self) -> MutexGuard<'_, Option<DateTime<Utc>>> {
        // A poisoned lock still holds a valid timestamp.
        self.last.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn next_reading(last: Option<DateTime<Utc>>, wall: DateTime<Utc>) -> DateTime<Utc> {
    let wall = wall.trunc_subsecs(6);
    match last {
        Some(prev) if prev > wall => prev,
        _ => wall,
    }
}
