//! Coordinate-quantized, time-expiring memoization of ETA calculations.
//!
//! Requests are keyed by their coordinates rounded to a fixed number of
//! decimal places, so nearby points share an entry. At the default precision
//! of 3 places a key covers roughly 111 m per axis at the equator. Serving a
//! neighbour's answer is intended: it trades a little accuracy for skipping
//! the spatial query.
//!
//! Expiry is passive. An entry is checked on read and replaced on the next
//! miss; nothing sweeps the table in the background. The table is capped at
//! [`CacheConfig::max_entries`]. Keys are also queued in insertion order, so
//! inserting at the cap pops expired entries off the old end of the queue and
//! then, if still full, the oldest live one. Every queued record is popped at
//! most once, which keeps the work per insertion amortized constant.
//!
//! Concurrent misses for the same key are not coalesced: both callers compute
//! and the last writer wins.

use crate::{
    EtaCalculator, GeoPoint, MonotonicClock, NearestVehicleLookup, Result, TimeSource,
    time::duration_to_millis,
};
use core::time::Duration;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default lifetime of a cached ETA.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(15);

/// Default number of decimal places kept in cache keys.
pub const DEFAULT_PRECISION: u32 = 3;

/// Largest supported key precision.
pub const MAX_PRECISION: u32 = 9;

/// Default upper bound on the number of cached keys.
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

/// Which computation a cache entry memoizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CalculateEta,
}

/// A quantized cache key.
///
/// Coordinates are stored as integers scaled by `10^precision`, rounded half
/// away from zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    pub latitude: i64,
    pub longitude: i64,
}

impl CacheKey {
    pub fn new(operation: Operation, point: GeoPoint, precision: u32) -> Self {
        let scale = 10_f64.powi(precision.min(MAX_PRECISION) as i32);
        Self {
            operation,
            latitude: quantize(point.latitude(), scale),
            longitude: quantize(point.longitude(), scale),
        }
    }
}

// Bounded by 180 * 10^MAX_PRECISION, far inside i64.
fn quantize(degrees: f64, scale: f64) -> i64 {
    (degrees * scale).round() as i64
}

// The insertion queue is rebuilt once it outgrows the table by this much.
const COMPACT_SLACK: usize = 64;

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    value: f64,
    inserted_at: u64,
    /// Position of this write in the insertion queue.
    seq: u64,
}

impl CacheEntry {
    const fn is_live(&self, now: u64, expiration_ms: u64) -> bool {
        now.saturating_sub(self.inserted_at) < expiration_ms
    }
}

/// Stored entries plus their keys in insertion order, oldest first.
///
/// A queued record whose key was since removed or rewritten no longer matches
/// the entry's `seq` and is skipped. Timestamps come from a monotonic clock,
/// so expired entries always sit at the front.
#[derive(Debug, Default)]
struct Table {
    entries: HashMap<CacheKey, CacheEntry>,
    order: VecDeque<(CacheKey, u64)>,
    next_seq: u64,
}

impl Table {
    fn current(&self, key: &CacheKey, seq: u64) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| entry.seq == seq)
    }

    fn insert(&mut self, key: CacheKey, value: f64, now: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                seq,
            },
        );
        self.order.push_back((key, seq));

        if self.order.len() > 2 * self.entries.len() + COMPACT_SLACK {
            let entries = &self.entries;
            self.order
                .retain(|(key, seq)| entries.get(key).is_some_and(|entry| entry.seq == *seq));
        }
    }

    /// Pops records off the front of the queue: stale ones, expired entries,
    /// and live entries while the table holds `max_entries` or more. Stops at
    /// the first live entry once there is room.
    ///
    /// Returns how many records were examined.
    fn make_room(&mut self, max_entries: usize, now: u64, expiration_ms: u64) -> usize {
        let mut examined = 0;
        while let Some(&(key, seq)) = self.order.front() {
            match self.current(&key, seq).copied() {
                None => {}
                Some(entry)
                    if !entry.is_live(now, expiration_ms)
                        || self.entries.len() >= max_entries =>
                {
                    self.entries.remove(&key);
                }
                Some(_) => break,
            }
            self.order.pop_front();
            examined += 1;
        }
        examined
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Tuning knobs for [`EtaCache`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheConfig {
    /// How long an entry is served after being computed.
    pub expiration: Duration,
    /// Decimal places kept from each coordinate, at most [`MAX_PRECISION`].
    pub precision: u32,
    /// Upper bound on stored keys.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration: DEFAULT_EXPIRATION,
            precision: DEFAULT_PRECISION,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Hit/miss counters since the cache was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing front for an [`EtaCalculator`].
pub struct EtaCache<L, T = MonotonicClock> {
    calculator: EtaCalculator<L>,
    config: CacheConfig,
    clock: T,
    table: Mutex<Table>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<L: NearestVehicleLookup> EtaCache<L> {
    /// Creates a cache reading time from a fresh [`MonotonicClock`].
    pub fn new(calculator: EtaCalculator<L>, config: CacheConfig) -> Self {
        Self::with_clock(calculator, config, MonotonicClock::default())
    }
}

impl<L: NearestVehicleLookup, T: TimeSource> EtaCache<L, T> {
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(calculator: EtaCalculator<L>, config: CacheConfig, clock: T) -> Self {
        Self {
            calculator,
            config,
            clock,
            table: Mutex::new(Table::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the ETA for `point`, computing it only if no live entry exists
    /// for its quantized key.
    ///
    /// On a miss the calculator receives the original, unrounded point.
    ///
    /// # Errors
    ///
    /// Propagates any [`EtaCalculator::calculate`] error. Errors are never
    /// cached.
    pub async fn get(&self, point: GeoPoint) -> Result<f64> {
        let key = CacheKey::new(Operation::CalculateEta, point, self.config.precision);

        if let Some(eta) = self.read(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?key, eta, "Cache hit");
            return Ok(eta);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(?key, "Cache miss");

        let eta = self.calculator.calculate(point).await?;
        self.write(key, eta);
        Ok(eta)
    }

    /// Returns a live value for `key`, dropping the entry if it has expired.
    fn read(&self, key: &CacheKey) -> Option<f64> {
        let now = self.clock.current_millis();
        let expiration_ms = duration_to_millis(self.config.expiration);
        let mut table = self.table.lock();

        match table.entries.get(key) {
            Some(entry) if entry.is_live(now, expiration_ms) => Some(entry.value),
            Some(_) => {
                table.entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn write(&self, key: CacheKey, value: f64) {
        let now = self.clock.current_millis();
        let expiration_ms = duration_to_millis(self.config.expiration);
        let mut table = self.table.lock();

        if !table.entries.contains_key(&key) && table.entries.len() >= self.config.max_entries {
            table.make_room(self.config.max_entries, now, expiration_ms);
        }
        table.insert(key, value, now);
    }

    /// Number of stored entries, including expired ones not yet replaced.
    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.table.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub const fn calculator(&self) -> &EtaCalculator<L> {
        &self.calculator
    }
}
