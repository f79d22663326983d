//! Caches owned by the caller of a layout pass.
//!
//! [`LayoutCache`] holds resolved cell sizes, column widths, row heights and
//! merged geometry for one worksheet snapshot. Entries are never invalidated
//! implicitly: after mutating the worksheet, call [`LayoutCache::clear`] or
//! start from a fresh cache.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::cell_ref::CellRange;

/// Resolved size of a merged block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRegion {
    pub range: CellRange,
    /// Sum of the spanned column widths
    pub width: f64,
    /// Sum of the spanned row heights
    pub height: f64,
}

/// Memoized layout results for one worksheet snapshot.
#[derive(Debug, Default)]
pub struct LayoutCache {
    pub(crate) cell_sizes: HashMap<(u32, u32), (f64, f64)>,
    pub(crate) column_widths: HashMap<u32, f64>,
    pub(crate) row_heights: HashMap<u32, f64>,
    pub(crate) merged: Option<Vec<MergedRegion>>,
    /// Rows holding an unmerged cell, per column. Built on first column query.
    pub(crate) column_members: Option<HashMap<u32, Vec<u32>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cell_sizes.clear();
        self.column_widths.clear();
        self.row_heights.clear();
        self.merged = None;
        self.column_members = None;
    }

    pub fn is_empty(&self) -> bool {
        self.cell_sizes.is_empty()
            && self.column_widths.is_empty()
            && self.row_heights.is_empty()
            && self.merged.is_none()
    }

    pub fn cached_cell_sizes(&self) -> usize {
        self.cell_sizes.len()
    }

    pub fn cached_column_widths(&self) -> usize {
        self.column_widths.len()
    }

    pub fn cached_row_heights(&self) -> usize {
        self.row_heights.len()
    }
}

/// A simple LRU cache with a fixed capacity.
///
/// When the cache exceeds capacity, the oldest (least recently inserted)
/// entries are evicted. Lookups do not promote entries.
#[derive(Debug)]
pub struct LruCache<K: Hash + Eq + Clone, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert a key-value pair. An existing key keeps its original value.
    /// Returns `true` if the entry was newly inserted.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key.clone(), value);
        self.order.push_back(key);
        self.enforce_cap();
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn enforce_cap(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}
