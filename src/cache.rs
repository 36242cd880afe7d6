//! Time-boxed in-memory cache of finished reports.
//!
//! Keys carry every normalized request parameter, so a key fully determines
//! its value and concurrent writers for the same key store identical reports.
//! Entries are never updated in place. An expired entry is dropped on the
//! next lookup of its key or on the next insert of any key. Only finished
//! reports are stored; errors never reach the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::{BuyReference, StockReport};
use crate::window::{format_date, ResolvedWindow, WindowMode};

/// Normalized request parameters identifying one report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ts_code: String,
    pub mode: WindowMode,
    pub start: String,
    pub end: String,
    pub n: Option<usize>,
    /// Bit patterns of the buy price and share count.
    pub buy: Option<(u64, Option<u64>)>,
}

impl CacheKey {
    pub fn new(
        ts_code: &str,
        mode: WindowMode,
        window: &ResolvedWindow,
        buy: Option<&BuyReference>,
    ) -> Self {
        Self {
            ts_code: ts_code.to_string(),
            mode,
            start: format_date(window.start),
            end: format_date(window.end),
            n: window.expected_count,
            buy: buy.map(|b| (b.price.to_bits(), b.shares.map(f64::to_bits))),
        }
    }
}

struct Entry {
    report: Arc<StockReport>,
    expires_at: Instant,
}

/// Report cache with separate lifetimes for populated and empty reports.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    ttl: Duration,
    empty_ttl: Duration,
}

impl ResponseCache {
    /// Create a cache. `ttl` applies to reports with data, `empty_ttl` to
    /// "no data" reports.
    pub fn new(ttl: Duration, empty_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            empty_ttl,
        }
    }

    /// Look up a live entry.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<StockReport>> {
        self.get_at(key, Instant::now())
    }

    /// Look up a live entry as of `now`, evicting it if expired.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Arc<StockReport>> {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("response cache lock poisoned; treating as miss");
            return None;
        };
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                debug!(ts_code = %key.ts_code, "cache hit");
                Some(entry.report.clone())
            }
            Some(_) => {
                entries.remove(key);
                debug!(ts_code = %key.ts_code, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store a report, replacing any previous entry for `key`.
    pub fn insert(&self, key: CacheKey, report: Arc<StockReport>) {
        self.insert_at(key, report, Instant::now());
    }

    /// Store a report as of `now`. Entries already expired at `now` are
    /// dropped first, so the map never holds more than the live set plus one.
    pub fn insert_at(&self, key: CacheKey, report: Arc<StockReport>, now: Instant) {
        let ttl = if report.is_empty() {
            self.empty_ttl
        } else {
            self.ttl
        };
        if let Ok(mut entries) = self.entries.lock() {
            let before = entries.len();
            entries.retain(|_, e| e.expires_at > now);
            let evicted = before - entries.len();
            if evicted > 0 {
                debug!(evicted, "expired cache entries dropped");
            }
            entries.insert(
                key,
                Entry {
                    report,
                    expires_at: now + ttl,
                },
            );
        }
    }

    /// Drop every entry that has expired by `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
