//! Replay-dedup store for `(key-id, ts, nonce)` triples.
//!
//! The auth proxy consults this before trusting a request: if the same
//! triple has been seen within the freshness window, the request is a
//! replay and must be rejected. The map lives entirely in-process — the
//! contract does not require durability across restarts.

#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

type NonceKey = (String, String, String);

/// An in-memory, mutex-guarded `(key-id, ts, nonce)` dedup store with a
/// sliding time-to-live equal to the auth proxy's freshness window.
///
/// `check_and_insert` is the only way to observe or mutate the map: the
/// single lock acquisition it performs is what makes "at most one caller
/// wins for a given triple" hold under concurrent access, with no second
/// round-trip needed.
pub struct NonceChecker {
    entries: Mutex<HashMap<NonceKey, Instant>>,
    maxage: Duration,
}

impl NonceChecker {
    /// Build a checker whose entries expire after `maxage`.
    pub fn new(maxage: Duration) -> Self {
        NonceChecker {
            entries: Mutex::new(HashMap::new()),
            maxage,
        }
    }

    /// Record `(key_id, ts, nonce)` if it has not been seen within the
    /// freshness window, returning `true` on success (fresh) and `false`
    /// if it's a replay.
    pub fn check_and_insert(&self, key_id: &str, ts: &str, nonce: &str) -> bool {
        let key = (key_id.to_string(), ts.to_string(), nonce.to_string());
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(seen_at) = entries.get(&key) {
            if now.duration_since(*seen_at) < self.maxage {
                return false;
            }
        }
        entries.insert(key, now);
        true
    }

    /// Drop every entry older than `maxage`. Intended to be called
    /// periodically by [`spawn_sweeper`]; never called while awaiting I/O.
    pub fn sweep(&self) {
        let now = Instant::now();
        let maxage = self.maxage;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, seen_at| now.duration_since(*seen_at) < maxage);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "nonce checker sweep");
        }
    }

    /// Number of entries currently tracked. Exposed for tests and metrics.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the checker currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Spawn a background task that calls [`NonceChecker::sweep`] on `period`,
/// for as long as the returned handle is not dropped/aborted.
pub fn spawn_sweeper(checker: Arc<NonceChecker>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            checker.sweep();
        }
    })
}
