// SPDX-License-Identifier: MIT

//! Bounded caches of compiled trees
//!
//! - `BoundedCache` - one segment, strict insertion order; reads never extend
//!   an entry's life
//! - `ConcurrentCache` - a fixed array of independently locked segments
//!   selected by key hash, each one a small LRU
//!
//! The striped cache gives up a single global recency order in exchange for
//! low contention. Capacity is still a hard bound: segment capacities add up
//! to exactly the configured capacity.

use super::tree::Tree;
use crate::error::ElError;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Storage for compiled trees keyed by their source text
pub trait TreeCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<Tree>>;

    /// Insert or replace. Replacing keeps the entry's position.
    fn put(&self, key: &str, tree: Arc<Tree>);

    fn size(&self) -> usize;
}

struct Entry {
    tree: Arc<Tree>,
    stamp: u64,
}

/// One bounded map. Eviction removes the entry with the oldest stamp.
struct Segment {
    capacity: usize,
    refresh_on_read: bool,
    entries: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
    clock: u64,
}

impl Segment {
    fn new(capacity: usize, refresh_on_read: bool) -> Self {
        Self {
            capacity,
            refresh_on_read,
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn get(&mut self, key: &str) -> Option<Arc<Tree>> {
        if !self.refresh_on_read {
            return self.entries.get(key).map(|e| e.tree.clone());
        }
        let stamp = self.tick();
        let entry = self.entries.get_mut(key)?;
        let key = self.order.remove(&entry.stamp)?;
        entry.stamp = stamp;
        self.order.insert(stamp, key);
        Some(entry.tree.clone())
    }

    fn put(&mut self, key: &str, tree: Arc<Tree>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.tree = tree;
            return;
        }
        let stamp = self.tick();
        self.entries.insert(key.to_string(), Entry { tree, stamp });
        self.order.insert(stamp, key.to_string());
        while self.entries.len() > self.capacity {
            match self.order.pop_first() {
                Some((_, eldest)) => {
                    log::debug!("evicting cached expression '{}'", eldest);
                    self.entries.remove(&eldest);
                }
                None => break,
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn lock(segment: &Mutex<Segment>) -> MutexGuard<'_, Segment> {
    // entries are immutable Arcs, a panic elsewhere cannot leave one torn
    segment.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_capacity(capacity: usize) -> Result<(), ElError> {
    if capacity == 0 {
        return Err(ElError::config("cache capacity must be positive"));
    }
    Ok(())
}

/// Single-segment cache evicting in insertion order
pub struct BoundedCache {
    segment: Mutex<Segment>,
}

impl BoundedCache {
    pub fn new(capacity: usize) -> Result<Self, ElError> {
        check_capacity(capacity)?;
        Ok(Self {
            segment: Mutex::new(Segment::new(capacity, false)),
        })
    }

    pub fn capacity(&self) -> usize {
        lock(&self.segment).capacity
    }
}

impl TreeCache for BoundedCache {
    fn get(&self, key: &str) -> Option<Arc<Tree>> {
        lock(&self.segment).get(key)
    }

    fn put(&self, key: &str, tree: Arc<Tree>) {
        lock(&self.segment).put(key, tree)
    }

    fn size(&self) -> usize {
        lock(&self.segment).len()
    }
}

/// Striped cache for many concurrent accessors
pub struct ConcurrentCache {
    segments: Vec<Mutex<Segment>>,
    hasher: RandomState,
}

impl ConcurrentCache {
    /// `concurrency` is the expected number of parallel accessors. It is
    /// rounded up to a power of two and capped at `capacity` so that every
    /// segment holds at least one entry.
    pub fn new(capacity: usize, concurrency: usize) -> Result<Self, ElError> {
        check_capacity(capacity)?;
        let count = concurrency.max(1).next_power_of_two().min(capacity);
        let base = capacity / count;
        let extra = capacity % count;
        let segments = (0..count)
            .map(|i| {
                let size = base + usize::from(i < extra);
                Mutex::new(Segment::new(size, true))
            })
            .collect();
        log::debug!(
            "created concurrent cache with capacity {} in {} segments",
            capacity,
            count
        );
        Ok(Self {
            segments,
            hasher: RandomState::new(),
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn capacity(&self) -> usize {
        self.segments.iter().map(|s| lock(s).capacity).sum()
    }

    fn segment(&self, key: &str) -> &Mutex<Segment> {
        let hash = self.hasher.hash_one(key);
        &self.segments[(hash % self.segments.len() as u64) as usize]
    }
}

impl TreeCache for ConcurrentCache {
    fn get(&self, key: &str) -> Option<Arc<Tree>> {
        lock(self.segment(key)).get(key)
    }

    fn put(&self, key: &str, tree: Arc<Tree>) {
        lock(self.segment(key)).put(key, tree)
    }

    fn size(&self) -> usize {
        self.segments.iter().map(|s| lock(s).len()).sum()
    }
}
