//! Iteration depth tracking.
//!
//! Single-threaded counter of the traversals currently walking a store.
//! Unlike a reentrancy lock, nesting is allowed: every traversal takes a
//! guard, and structural rewrites of the order array wait until the count
//! is back to zero.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-store traversal counter. Embed this in a struct and hold
/// `let _g = self.depth.enter();` for as long as array positions must stay
/// stable.
#[derive(Debug)]
pub struct IterationDepth {
    depth: Cell<usize>,
    // Keep !Send + !Sync in line with single-threaded design.
    _nosend: PhantomData<*mut ()>,
}

impl IterationDepth {
    /// Create a counter at depth zero. Const so it can be a field default.
    pub const fn new() -> Self {
        Self {
            depth: Cell::new(0),
            _nosend: PhantomData,
        }
    }

    /// Number of guards currently alive.
    #[inline]
    pub fn get(&self) -> usize {
        self.depth.get()
    }

    /// True when no traversal is in progress.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.depth.get() == 0
    }

    /// Enter a traversal. The returned guard decrements on drop, including
    /// during unwinding.
    #[inline]
    pub fn enter(&self) -> DepthGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        DepthGuard { owner: self }
    }
}

impl Default for IterationDepth {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `IterationDepth::enter`.
#[derive(Debug)]
pub struct DepthGuard<'a> {
    owner: &'a IterationDepth,
}

impl<'a> Drop for DepthGuard<'a> {
    fn drop(&mut self) {
        let d = self.owner.depth.get();
        debug_assert!(d > 0, "iteration depth underflow");
        self.owner.depth.set(d - 1);
    }
}
