//! Allocation scope for out-of-line value data.
//!
//! Every pointer-kind [`Value`](crate::Value) borrows from an `Arena`. The
//! arena hands out shared references with its own lifetime, so values cannot
//! outlive it, and [`Arena::reset`] needs `&mut self`, so no value survives a
//! reset either.
//!
//! Allocation is bump-style and memory is released in bulk. Only `Copy`
//! types are accepted: the arena never runs destructors, so anything with
//! drop glue would leak.

use bumpalo::Bump;

/// Tuning knobs for [`Arena::with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaOptions {
    /// Bytes to reserve up front. Zero defers allocation to first use.
    pub initial_capacity: usize,
}

impl ArenaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `bytes` when the arena is created.
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }
}

/// Bump allocator that owns the data referenced by one evaluation's values.
#[derive(Debug, Default)]
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena configured by `options`.
    pub fn with_options(options: ArenaOptions) -> Self {
        Self {
            bump: Bump::with_capacity(options.initial_capacity),
        }
    }

    /// Move `value` into the arena.
    pub fn alloc<T: Copy>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    /// Copy a string into the arena.
    pub fn alloc_str(&self, value: &str) -> &str {
        self.bump.alloc_str(value)
    }

    /// Copy a byte slice into the arena.
    pub fn alloc_bytes(&self, value: &[u8]) -> &[u8] {
        self.bump.alloc_slice_copy(value)
    }

    /// Copy a slice of `Copy` items into the arena.
    pub fn alloc_slice<T: Copy>(&self, items: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(items)
    }

    /// Collect an exact-size iterator into an arena slice.
    pub fn alloc_from_iter<T, I>(&self, items: I) -> &[T]
    where
        T: Copy,
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(items)
    }

    /// Bytes currently held by the arena, including unused chunk capacity.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Release everything allocated so far, keeping the largest chunk for
    /// reuse.
    pub fn reset(&mut self) {
        tracing::trace!(allocated_bytes = self.bump.allocated_bytes(), "resetting value arena");
        self.bump.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_returns_copy() {
        let arena = Arena::new();
        let n = arena.alloc(42_i64);
        let s = arena.alloc_str("hello");
        let b = arena.alloc_bytes(b"\x01\x02");
        assert_eq!(*n, 42);
        assert_eq!(s, "hello");
        assert_eq!(b, &[1, 2]);
    }

    #[test]
    fn test_alloc_from_iter() {
        let arena = Arena::new();
        let items = arena.alloc_from_iter([1_i64, 2, 3].into_iter().map(|i| i * 10));
        assert_eq!(items, &[10, 20, 30]);
    }

    #[test]
    fn test_options_reserve_capacity() {
        let arena = Arena::with_options(ArenaOptions::new().with_initial_capacity(4096));
        assert!(arena.allocated_bytes() >= 4096);
    }

    #[test]
    fn test_reset_allows_reuse() {
        let mut arena = Arena::new();
        {
            let s = arena.alloc_str("first scope");
            assert_eq!(s, "first scope");
        }
        arena.reset();
        let s = arena.alloc_str("second scope");
        assert_eq!(s, "second scope");
    }
}
