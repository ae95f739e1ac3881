//! Content-hash dedup key derivation and the LRU/TTL cache that remembers
//! recently-dispatched keys.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL_HOURS: u64 = 24;
pub const MAX_CACHE_SIZE: usize = 10_000;

#[derive(Hash)]
struct DedupKeyParts<'a> {
    alert_type: &'a str,
    market_id: &'a str,
    wallet_id: &'a str,
    direction: &'a str,
    volume_bucket: i64,
}

/// Buckets volume to the nearest $1,000 so near-identical repeat alerts
/// collapse to the same key instead of drifting apart on exact cents.
pub fn dedup_key(alert_type: &str, market_id: &str, wallet_id: &str, direction: &str, volume: f64) -> u64 {
    let volume_bucket = ((volume / 1_000.0).round() as i64) * 1_000;
    let parts = DedupKeyParts { alert_type, market_id, wallet_id, direction, volume_bucket };
    let mut hasher = DefaultHasher::new();
    parts.hash(&mut hasher);
    hasher.finish()
}

pub struct DedupCache {
    ttl: Duration,
    max_size: usize,
    entries: HashMap<u64, Instant>,
    order: VecDeque<u64>,
}

impl DedupCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self { ttl, max_size, entries: HashMap::new(), order: VecDeque::new() }
    }

    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_HOURS * 3_600), MAX_CACHE_SIZE)
    }

    /// Sweeps expired entries, then checks `key`. Returns `true` (duplicate,
    /// caller should drop the alert) if the key was already present and
    /// unexpired; otherwise records it and returns `false`.
    pub fn check_and_insert(&mut self, key: u64) -> bool {
        self.sweep_expired();

        if self.entries.contains_key(&key) {
            return true;
        }

        self.entries.insert(key, Instant::now());
        self.order.push_back(key);
        if self.entries.len() > self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        false
    }

    fn sweep_expired(&mut self) {
        let now = Instant::now();
        while let Some(&front) = self.order.front() {
            match self.entries.get(&front) {
                Some(&inserted) if now.duration_since(inserted) > self.ttl => {
                    self.order.pop_front();
                    self.entries.remove(&front);
                }
                Some(_) => break,
                None => {
                    self.order.pop_front();
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
