//! Arena memory management for parsed documents
//!
//! Two allocator shapes back a parse state: a slab pool of fixed-size
//! value slots ([`NodePool`]) and growable buckets of variable-length
//! runs ([`Bucket`]). Neither releases individual allocations; a whole
//! chain is rewound on state reset and freed on state release.

pub mod bucket;
pub mod pool;

pub use bucket::{Bucket, BucketRef};
pub use pool::NodePool;

use crate::config::AllocTracker;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Byte accounting shared by every chain of one parse state.
///
/// Carving a block first charges the budget; exceeding the limit makes
/// the carve fail so the parser can surface a `Memory` error instead of
/// growing without bound. The optional tracker observes the same
/// traffic.
pub struct MemoryBudget {
    limit: usize,
    used: AtomicUsize,
    peak: AtomicUsize,
    tracker: Option<Arc<dyn AllocTracker>>,
}

impl MemoryBudget {
    /// Create a budget with the given byte limit and optional tracker
    pub fn new(limit: usize, tracker: Option<Arc<dyn AllocTracker>>) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            tracker,
        }
    }

    /// Try to account for a newly carved block. Returns false when the
    /// block would push usage past the limit; nothing is charged then.
    pub fn charge(&self, bytes: usize) -> bool {
        let used = self.used.load(Ordering::Relaxed);
        let Some(next) = used.checked_add(bytes) else {
            return false;
        };
        if next > self.limit {
            return false;
        }
        self.used.store(next, Ordering::Relaxed);
        if next > self.peak.load(Ordering::Relaxed) {
            self.peak.store(next, Ordering::Relaxed);
        }
        if let Some(tracker) = &self.tracker {
            tracker.on_alloc(bytes);
        }
        true
    }

    /// Account for a freed block
    pub fn release(&self, bytes: usize) {
        let used = self.used.load(Ordering::Relaxed);
        self.used.store(used.saturating_sub(bytes), Ordering::Relaxed);
        if let Some(tracker) = &self.tracker {
            tracker.on_free(bytes);
        }
    }

    /// Bytes currently carved across all chains
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// High-water mark of carved bytes
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}
