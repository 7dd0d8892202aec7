//! Hole compaction policy for the order array.

/// Decides when the order array holds enough tombstones to be rebuilt.
///
/// A store compacts when no traversal is in progress, the physical array
/// is longer than `min_len`, and `holes > len / hole_divisor`. The default
/// (`16`, `2`) compacts once holes are a strict majority.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompactionPolicy {
    min_len: usize,
    // 0 disables compaction.
    hole_divisor: usize,
}

impl CompactionPolicy {
    pub const DEFAULT_MIN_LEN: usize = 16;
    pub const DEFAULT_HOLE_DIVISOR: usize = 2;

    pub const fn new() -> Self {
        Self {
            min_len: Self::DEFAULT_MIN_LEN,
            hole_divisor: Self::DEFAULT_HOLE_DIVISOR,
        }
    }

    /// A policy that never compacts. Tombstones accumulate until `clear`.
    pub const fn never() -> Self {
        Self {
            min_len: usize::MAX,
            hole_divisor: 0,
        }
    }

    pub const fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Compact once `holes > len / divisor`. A divisor of 0 disables
    /// compaction.
    pub const fn with_hole_divisor(mut self, divisor: usize) -> Self {
        self.hole_divisor = divisor;
        self
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn hole_divisor(&self) -> usize {
        self.hole_divisor
    }

    /// Threshold check for an array of `len` slots with `holes` tombstones.
    /// Does not consider iteration depth; callers gate on that first.
    pub fn should_compact(&self, len: usize, holes: usize) -> bool {
        if self.hole_divisor == 0 || holes == 0 {
            return false;
        }
        len > self.min_len && holes > len / self.hole_divisor
    }
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self::new()
    }
}
