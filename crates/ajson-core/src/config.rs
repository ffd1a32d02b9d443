//! Parser configuration
//!
//! Block capacities, the recursion budget and the optional allocation
//! tracker travel together as one configuration value. A reused state
//! only keeps its memory when the new configuration is
//! allocation-compatible with the one it was built with.

use std::fmt;
use std::sync::Arc;

/// Observer for block-level allocation traffic.
///
/// Called once per carved or freed block, not per parsed value. This is
/// the pluggable allocation hook of the engine: callers that need
/// accounting or custom limits register a tracker and watch the
/// steady-state footprint across reused parses.
pub trait AllocTracker: Send + Sync {
    /// A block of `bytes` bytes was carved from the system allocator
    fn on_alloc(&self, bytes: usize);
    /// A block of `bytes` bytes was returned to the system allocator
    fn on_free(&self, bytes: usize);
}

/// Configuration for a parse state's arenas and grammar limits.
#[derive(Clone)]
pub struct ParserConfig {
    /// Value nodes per pool block
    pub node_block_capacity: usize,
    /// Bytes per string bucket block
    pub string_block_capacity: usize,
    /// Slots per backing-storage bucket block (array elements, object pairs)
    pub backing_block_capacity: usize,
    /// Maximum recursion depth of the grammar before the parse fails
    /// with a `Memory` error
    pub max_depth: usize,
    /// Upper bound on bytes carved across all chains of one state
    pub max_total_memory: usize,
    /// Optional allocation observer, shared with every chain of the state
    pub tracker: Option<Arc<dyn AllocTracker>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            node_block_capacity: 64,
            string_block_capacity: 4096,
            backing_block_capacity: 128,
            max_depth: 512,
            max_total_memory: usize::MAX,
            tracker: None,
        }
    }
}

impl ParserConfig {
    /// Configuration for low-memory environments: small blocks, a tight
    /// total budget and a shallow recursion limit.
    pub fn low_memory() -> Self {
        Self {
            node_block_capacity: 16,
            string_block_capacity: 512,
            backing_block_capacity: 32,
            max_depth: 64,
            max_total_memory: 64 * 1024,
            tracker: None,
        }
    }

    /// Attach an allocation tracker
    pub fn with_tracker(mut self, tracker: Arc<dyn AllocTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Replace the recursion limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the total memory budget
    pub fn with_max_total_memory(mut self, bytes: usize) -> Self {
        self.max_total_memory = bytes;
        self
    }

    /// Whether a state built with `self` can be reset and reused under
    /// `other` without releasing its chains. Capacities and the memory
    /// budget must match and the tracker must be the same object.
    pub fn same_allocation(&self, other: &Self) -> bool {
        let same_tracker = match (&self.tracker, &other.tracker) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_tracker
            && self.node_block_capacity == other.node_block_capacity
            && self.string_block_capacity == other.string_block_capacity
            && self.backing_block_capacity == other.backing_block_capacity
            && self.max_total_memory == other.max_total_memory
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("node_block_capacity", &self.node_block_capacity)
            .field("string_block_capacity", &self.string_block_capacity)
            .field("backing_block_capacity", &self.backing_block_capacity)
            .field("max_depth", &self.max_depth)
            .field("max_total_memory", &self.max_total_memory)
            .field("tracker", &self.tracker.is_some())
            .finish()
    }
}
