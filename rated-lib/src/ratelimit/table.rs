use super::bucket::Bucket;

/// Fixed-size array of buckets, allocated once and never resized.
#[derive(Debug, Clone)]
pub struct BucketTable {
    buckets: Box<[Bucket]>,
}

impl BucketTable {
    /// Allocate `size` buckets, all in the "never used" state.
    ///
    /// A zero-sized table is rejected by [`Limiter`](super::Limiter) before it
    /// gets here; `slot_for` would map every hash to slot 0 of an empty table.
    pub fn new(size: usize) -> Self {
        Self { buckets: vec![Bucket::default(); size].into_boxed_slice() }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bucket> {
        self.buckets.get_mut(index)
    }

    /// Return every bucket to the "never used" state.
    pub fn reset(&mut self) {
        self.buckets.fill(Bucket::default());
    }
}

/// `hash mod len`, or 0 for an empty table.
#[inline]
pub(crate) fn slot_for(hash: u64, len: usize) -> usize {
    // usize -> u64 is lossless on every supported target, and the remainder
    // is below `len`, so it fits back into usize.
    hash.checked_rem(len as u64).unwrap_or_default() as usize
}
