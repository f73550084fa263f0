// ── Foreign reference accounting ──
//
// Every engine object handed across the boundary is pinned by a reference
// number until the client destroys it. Leaking a number leaks the engine
// object behind it, so `ForeignRef` destroys its entry on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use dashmap::DashMap;

use crate::command::Command;

/// Table of live reference numbers held by this process.
#[derive(Debug)]
pub struct RefTable {
    next: AtomicI32,
    live: DashMap<i32, Command>,
}

impl Default for RefTable {
    fn default() -> Self {
        Self {
            next: AtomicI32::new(1),
            live: DashMap::new(),
        }
    }
}

impl RefTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Pin a new engine object and return the guard that releases it.
    pub fn acquire(self: &Arc<Self>, command: Command) -> ForeignRef {
        let num = self.next.fetch_add(1, Ordering::Relaxed);
        self.live.insert(num, command);
        tracing::trace!(refnum = num, %command, "foreign reference acquired");
        ForeignRef {
            num,
            table: Arc::clone(self),
        }
    }

    /// Number of references currently pinned.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Number of pinned references belonging to `command` connections.
    pub fn live_for(&self, command: Command) -> usize {
        self.live.iter().filter(|entry| *entry.value() == command).count()
    }

    fn destroy(&self, num: i32) {
        if self.live.remove(&num).is_some() {
            tracing::trace!(refnum = num, "foreign reference destroyed");
        } else {
            tracing::warn!(refnum = num, "foreign reference destroyed twice");
        }
    }
}

/// Owned pin on one engine object. Dropping it destroys the reference.
#[derive(Debug)]
pub struct ForeignRef {
    num: i32,
    table: Arc<RefTable>,
}

impl ForeignRef {
    pub fn num(&self) -> i32 {
        self.num
    }
}

impl Drop for ForeignRef {
    fn drop(&mut self) {
        self.table.destroy(self.num);
    }
}
