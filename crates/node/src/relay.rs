//! Relay bookkeeping.
//!
//! Each announced object is relayed once; entries expire after fifteen
//! minutes so the map does not grow without bound.

use dpos_messages::{Inventory, RELAY_EXPIRY};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Instant;

/// Tracks which inventory entries were already relayed.
#[derive(Debug, Default)]
pub struct RelayMap {
    entries: BTreeMap<Inventory, Instant>,
}

impl RelayMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inventory entry; returns true when it was not yet known
    /// (i.e. the object should be relayed now).
    pub fn should_relay(&mut self, inv: Inventory) -> bool {
        self.should_relay_at(inv, Instant::now())
    }

    /// Clock-injected form of [`should_relay`](Self::should_relay). Expired
    /// entries are purged on every call.
    pub fn should_relay_at(&mut self, inv: Inventory, now: Instant) -> bool {
        self.entries
            .retain(|_, seen| now.duration_since(*seen) < RELAY_EXPIRY);
        match self.entries.entry(inv) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
