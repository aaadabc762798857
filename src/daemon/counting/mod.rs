//! Aggregation of key presses for the current session.
//!
//! [KeyTally] is the single piece of shared state in the daemon. It is created once during
//! startup and handed to every component through an [Arc](std::sync::Arc).

pub mod session;
pub mod store;

use chrono::NaiveDateTime;
use session::Session;
use store::{CounterSnapshot, CounterStore};

#[derive(Debug)]
pub struct KeyTally {
    session: Session,
    counters: CounterStore,
}

impl KeyTally {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            session: Session::new(start),
            counters: CounterStore::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// See [CounterStore::record].
    pub fn record(&self, key: &str) -> u64 {
        self.counters.record(key)
    }

    pub fn total(&self) -> u64 {
        self.counters.total()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }
}
