//! Shared doubles for unit tests inside the crate.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::Credential;

/// Clock that only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock pinned to 2024-01-01T08:00:00Z.
    pub fn new_year_breakfast() -> Self {
        Self::new(fixed_now())
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    match DateTime::from_timestamp(1_704_096_000, 0) {
        Some(now) => now,
        None => panic!("fixed timestamp out of range"),
    }
}

/// Credential valid for one hour from [`fixed_now`].
pub fn hour_long_credential(token: &str) -> Credential {
    match Credential::new(token, Some(fixed_now() + TimeDelta::hours(1))) {
        Ok(credential) => credential,
        Err(error) => panic!("fixture credential invalid: {error}"),
    }
}
