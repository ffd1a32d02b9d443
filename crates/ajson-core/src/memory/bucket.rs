//! Growable buckets for variable-length runs
//!
//! A bucket is a chain of fixed-capacity blocks supporting two
//! operations: bump-allocate a run from a block's unused tail, and grow
//! the most recent run in place when it still ends at that tail. A
//! reset rewinds every block to empty without freeing, so a reused
//! state parses similar documents with zero new allocations.

use super::MemoryBudget;
use crate::error::{ParseError, Result};
use std::sync::Arc;

/// Length prefix written before every string record, in bytes
pub(crate) const STR_HEADER: usize = 4;

/// Handle to a run inside one bucket block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketRef {
    pub(crate) block: u32,
    pub(crate) offset: u32,
}

struct Block<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> Block<T> {
    fn room(&self) -> usize {
        self.capacity - self.data.len()
    }
}

/// Bump-pointer allocator over a chain of fixed-capacity blocks.
///
/// `Bucket<u8>` backs string bytes, `Bucket<u32>` backs array and
/// object storage runs.
pub struct Bucket<T> {
    blocks: Vec<Block<T>>,
    block_capacity: usize,
    budget: Arc<MemoryBudget>,
}

impl<T: Copy + Default> Bucket<T> {
    /// Create an empty bucket; no block is carved until the first extract
    pub fn new(block_capacity: usize, budget: Arc<MemoryBudget>) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            budget,
        }
    }

    /// Bump-allocate a run of `n` default-filled slots.
    ///
    /// The newest block with room wins; older blocks are only useful
    /// after a reset, when the whole chain is empty again. A run larger
    /// than the configured capacity gets a dedicated block.
    pub fn extract(&mut self, n: usize) -> Result<BucketRef> {
        let index = match self.find_room(n) {
            Some(index) => index,
            None => self.carve(n)?,
        };
        let block = &mut self.blocks[index];
        let offset = block.data.len();
        block.data.resize(offset + n, T::default());
        Ok(BucketRef {
            block: u32::try_from(index)
                .map_err(|_| ParseError::internal("bucket block index overflow"))?,
            offset: u32::try_from(offset)
                .map_err(|_| ParseError::internal("bucket offset overflow"))?,
        })
    }

    /// Grow the run at `r` from `old` to `new` slots in place.
    ///
    /// Valid only while the run still ends at its block's tail and the
    /// growth fits the block capacity; returns false otherwise so the
    /// caller can reallocate and copy.
    pub fn grow_in_place(&mut self, r: BucketRef, old: usize, new: usize) -> bool {
        let Some(block) = self.blocks.get_mut(r.block as usize) else {
            return false;
        };
        let offset = r.offset as usize;
        if offset + old != block.data.len() || offset + new > block.capacity {
            return false;
        }
        block.data.resize(offset + new, T::default());
        true
    }

    /// Grow a run, preferring in-place growth and falling back to
    /// allocate-and-copy. `run` is `None` for the first allocation.
    pub fn grow_run(
        &mut self,
        run: Option<BucketRef>,
        old: usize,
        new: usize,
    ) -> Result<BucketRef> {
        match run {
            None => self.extract(new),
            Some(r) if self.grow_in_place(r, old, new) => Ok(r),
            Some(r) => {
                let dst = self.extract(new)?;
                self.copy_run(r, dst, old);
                Ok(dst)
            }
        }
    }

    /// Borrow `n` slots starting at `r`
    pub fn slice(&self, r: BucketRef, n: usize) -> &[T] {
        let offset = r.offset as usize;
        &self.blocks[r.block as usize].data[offset..offset + n]
    }

    /// Mutably borrow `n` slots starting at `r`
    pub fn slice_mut(&mut self, r: BucketRef, n: usize) -> &mut [T] {
        let offset = r.offset as usize;
        &mut self.blocks[r.block as usize].data[offset..offset + n]
    }

    /// Rewind every block to empty without freeing memory
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.data.clear();
        }
    }

    /// Blocks carved so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn find_room(&self, n: usize) -> Option<usize> {
        (0..self.blocks.len())
            .rev()
            .find(|&i| self.blocks[i].room() >= n)
    }

    fn carve(&mut self, min: usize) -> Result<usize> {
        let capacity = self.block_capacity.max(min);
        let bytes = capacity * std::mem::size_of::<T>();
        if !self.budget.charge(bytes) {
            return Err(ParseError::memory("out of memory when carving bucket block"));
        }
        tracing::trace!(bytes, blocks = self.blocks.len() + 1, "carved bucket block");
        self.blocks.push(Block {
            data: Vec::with_capacity(capacity),
            capacity,
        });
        Ok(self.blocks.len() - 1)
    }

    fn copy_run(&mut self, src: BucketRef, dst: BucketRef, n: usize) {
        if n == 0 {
            return;
        }
        let (sb, db) = (src.block as usize, dst.block as usize);
        let (so, dof) = (src.offset as usize, dst.offset as usize);
        if sb == db {
            self.blocks[sb].data.copy_within(so..so + n, dof);
        } else if sb < db {
            let (head, tail) = self.blocks.split_at_mut(db);
            tail[0].data[dof..dof + n].copy_from_slice(&head[sb].data[so..so + n]);
        } else {
            let (head, tail) = self.blocks.split_at_mut(sb);
            head[db].data[dof..dof + n].copy_from_slice(&tail[0].data[so..so + n]);
        }
    }
}

impl Bucket<u8> {
    /// Store a `(length, payload)` string record and return its handle.
    /// The length prefix immediately precedes the payload bytes.
    pub fn alloc_record(&mut self, payload: &[u8]) -> Result<BucketRef> {
        let len = u32::try_from(payload.len())
            .map_err(|_| ParseError::internal("string record length overflow"))?;
        let r = self.extract(STR_HEADER + payload.len())?;
        let dst = self.slice_mut(r, STR_HEADER + payload.len());
        dst[..STR_HEADER].copy_from_slice(&len.to_le_bytes());
        dst[STR_HEADER..].copy_from_slice(payload);
        Ok(r)
    }

    /// Read a record's length from its prefix, O(1)
    pub fn record_len(&self, r: BucketRef) -> usize {
        let mut header = [0u8; STR_HEADER];
        header.copy_from_slice(self.slice(r, STR_HEADER));
        u32::from_le_bytes(header) as usize
    }

    /// Borrow a record's payload bytes
    pub fn record_bytes(&self, r: BucketRef) -> &[u8] {
        let len = self.record_len(r);
        &self.slice(r, STR_HEADER + len)[STR_HEADER..]
    }
}

impl<T> Drop for Bucket<T> {
    fn drop(&mut self) {
        for block in &self.blocks {
            self.budget.release(block.capacity * std::mem::size_of::<T>());
        }
    }
}
