//! Slab pool for value nodes
//!
//! Fixed-capacity blocks of `Value` slots chained in carve order.
//! Nodes are never released individually during a parse; the whole
//! chain is rewound by [`NodePool::reset`] and dropped with the state.

use super::MemoryBudget;
use crate::error::{ParseError, Result};
use crate::value::{Value, ValueId};
use std::sync::Arc;

/// Fixed-size-block allocator handing out [`ValueId`] handles.
///
/// Every block has the same slot capacity, so a handle is a flat index:
/// `block * capacity + slot`. After a reset, acquisition refills the
/// earliest blocks before a new block is carved.
pub struct NodePool {
    blocks: Vec<Vec<Value>>,
    block_capacity: usize,
    active: usize,
    count: usize,
    budget: Arc<MemoryBudget>,
}

impl NodePool {
    /// Create an empty pool; no block is carved until the first acquire
    pub fn new(block_capacity: usize, budget: Arc<MemoryBudget>) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            active: 0,
            count: 0,
            budget,
        }
    }

    /// Store one value in the pool and return its handle
    pub fn acquire(&mut self, value: Value) -> Result<ValueId> {
        if !self.active_has_room() {
            self.advance_or_carve()?;
        }
        let block = &mut self.blocks[self.active];
        let slot = block.len();
        block.push(value);
        self.count += 1;

        let index = self.active * self.block_capacity + slot;
        let raw = u32::try_from(index)
            .map_err(|_| ParseError::internal("node pool index overflow"))?;
        Ok(ValueId(raw))
    }

    /// Read a node by handle. Handles issued before the last reset
    /// resolve to `None` until their slot is reacquired.
    pub fn get(&self, id: ValueId) -> Option<Value> {
        let index = id.0 as usize;
        let block = index / self.block_capacity;
        let slot = index % self.block_capacity;
        self.blocks.get(block)?.get(slot).copied()
    }

    /// Rewind every block to empty without freeing memory
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
        self.active = 0;
        self.count = 0;
    }

    /// Nodes currently acquired
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no node is acquired
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Blocks carved so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn active_has_room(&self) -> bool {
        self.blocks
            .get(self.active)
            .is_some_and(|block| block.len() < self.block_capacity)
    }

    fn advance_or_carve(&mut self) -> Result<()> {
        // Post-reset path: earlier-carved blocks are empty again.
        if self.active + 1 < self.blocks.len() {
            self.active += 1;
            return Ok(());
        }

        let bytes = self.block_capacity * std::mem::size_of::<Value>();
        if !self.budget.charge(bytes) {
            return Err(ParseError::memory("out of memory when creating value node"));
        }
        tracing::trace!(bytes, blocks = self.blocks.len() + 1, "carved node pool block");
        self.blocks.push(Vec::with_capacity(self.block_capacity));
        self.active = self.blocks.len() - 1;
        Ok(())
    }
}

impl Drop for NodePool {
    fn drop(&mut self) {
        let bytes = self.block_capacity * std::mem::size_of::<Value>();
        for _ in &self.blocks {
            self.budget.release(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(block_capacity: usize) -> NodePool {
        let budget = Arc::new(MemoryBudget::new(usize::MAX, None));
        NodePool::new(block_capacity, budget)
    }

    #[test]
    fn test_acquire_and_get() {
        let mut pool = pool(4);
        let id = pool.acquire(Value::Number(42.0)).unwrap();
        assert!(matches!(pool.get(id), Some(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn test_handles_are_flat_indices_across_blocks() {
        let mut pool = pool(2);
        let ids: Vec<_> = (0..5)
            .map(|i| pool.acquire(Value::Number(i as f64)).unwrap())
            .collect();
        assert_eq!(pool.block_count(), 3);
        for (i, id) in ids.iter().enumerate() {
            assert!(matches!(pool.get(*id), Some(Value::Number(n)) if n == i as f64));
        }
    }

    #[test]
    fn test_reset_refills_existing_blocks() {
        let budget = Arc::new(MemoryBudget::new(usize::MAX, None));
        let mut pool = NodePool::new(2, budget.clone());
        for i in 0..6 {
            pool.acquire(Value::Number(i as f64)).unwrap();
        }
        let carved = budget.used();
        assert_eq!(pool.block_count(), 3);

        pool.reset();
        assert!(pool.is_empty());
        for i in 0..6 {
            pool.acquire(Value::Number(i as f64)).unwrap();
        }
        // Same footprint: reset reuse never carves new blocks
        assert_eq!(pool.block_count(), 3);
        assert_eq!(budget.used(), carved);
    }

    #[test]
    fn test_stale_handle_resolves_to_none_after_reset() {
        let mut pool = pool(2);
        let _ = pool.acquire(Value::Null).unwrap();
        let id = pool.acquire(Value::Bool(true)).unwrap();
        pool.reset();
        assert!(pool.get(id).is_none());
    }

    #[test]
    fn test_budget_exhaustion_is_memory_error() {
        let budget = Arc::new(MemoryBudget::new(1, None));
        let mut pool = NodePool::new(64, budget);
        let err = pool.acquire(Value::Null).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Memory);
    }

    #[test]
    fn test_drop_releases_budget() {
        let budget = Arc::new(MemoryBudget::new(usize::MAX, None));
        {
            let mut pool = NodePool::new(8, budget.clone());
            pool.acquire(Value::Null).unwrap();
            assert!(budget.used() > 0);
        }
        assert_eq!(budget.used(), 0);
    }
}
