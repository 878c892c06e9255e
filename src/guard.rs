//! Per-caller "operation in progress" guard.
//!
//! Used to keep one caller from running the same slow operation twice at
//! once. Entries expire after a timeout so a request that never finished
//! cannot block its caller forever. This is advisory, not a lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Caller key -> time the operation started
#[derive(Clone)]
pub struct OperationGuard {
    entries: Arc<DashMap<String, Instant>>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl OperationGuard {
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            timeout,
            clock,
        }
    }

    /// Mark `key` busy. Returns `None` while a fresh entry for the key
    /// exists; a stale entry is replaced. Dropping the ticket clears it.
    pub fn try_begin(&self, key: &str) -> Option<OperationTicket> {
        let now = self.clock.now();

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.timeout {
                    return None;
                }
                // Stale, take it over
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        Some(OperationTicket {
            entries: self.entries.clone(),
            key: key.to_string(),
            started: now,
        })
    }

    /// Whether `key` currently holds a fresh entry
    #[cfg(test)]
    pub fn is_busy(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .map(|started| now.duration_since(*started) < self.timeout)
            .unwrap_or(false)
    }

    /// Drop every entry older than the timeout, returning how many went
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, started| now.duration_since(*started) < self.timeout);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Held while an operation runs
pub struct OperationTicket {
    entries: Arc<DashMap<String, Instant>>,
    key: String,
    started: Instant,
}

impl Drop for OperationTicket {
    fn drop(&mut self) {
        // Leave the entry alone if a later caller already took over a stale slot
        self.entries
            .remove_if(&self.key, |_, started| *started == self.started);
    }
}
