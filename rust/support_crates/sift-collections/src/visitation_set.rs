//! A thread-safe, grow-only bit set of document ordinals.

use std::sync::atomic::{AtomicU64, Ordering};

/// A fixed-capacity, grow-only set of document ordinals backed by atomic words.
///
/// `VisitationSet` records which documents of a single shard have already been
/// observed by a transaction. Ordinals are in `[0, capacity)`; ordinal `i` lives in
/// word `i >> 6`, bit `i & 63`.
///
/// ## Monotonicity
///
/// Bits are only ever set. There is no removal operation: once an ordinal has been
/// marked it stays marked for the lifetime of the set.
///
/// ## Memory Ordering
///
/// - [`mark`](Self::mark) is an atomic test-and-set (`fetch_or`) with `AcqRel` ordering.
///   Exactly one of several racing callers observes the bit as previously unset, so
///   counts derived from the return value never double count.
/// - [`contains`](Self::contains) uses an `Acquire` load and therefore observes every
///   mark that happened-before it.
///
/// ## Out-of-range ordinals
///
/// Passing an ordinal `>= capacity()` to `contains` or `mark` is a programming error
/// and panics. Use [`check`](Self::check) to validate an ordinal without panicking.
pub struct VisitationSet {
    words: Vec<AtomicU64>,
    capacity: usize,
}

impl VisitationSet {
    /// Creates an empty set able to hold ordinals in `[0, capacity)`.
    pub fn new(capacity: usize) -> Self {
        let words = (0..capacity.div_ceil(64))
            .map(|_| AtomicU64::new(0))
            .collect();
        VisitationSet { words, capacity }
    }

    /// Returns the exclusive upper bound of valid ordinals.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `ordinal` can be stored in this set.
    #[inline]
    pub fn check(&self, ordinal: usize) -> bool {
        ordinal < self.capacity
    }

    /// Returns `true` if `ordinal` has been marked.
    ///
    /// The answer may be stale as soon as it is returned if other threads are marking
    /// concurrently; it can only change from `false` to `true`.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal >= capacity()`.
    #[inline]
    pub fn contains(&self, ordinal: usize) -> bool {
        let (word, mask) = self.locate(ordinal);
        (word.load(Ordering::Acquire) & mask) != 0
    }

    /// Marks `ordinal` as visited and returns whether it was already marked.
    ///
    /// Marking is idempotent: a second call leaves the set unchanged and returns `true`.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal >= capacity()`.
    #[inline]
    pub fn mark(&self, ordinal: usize) -> bool {
        let (word, mask) = self.locate(ordinal);
        (word.fetch_or(mask, Ordering::AcqRel) & mask) != 0
    }

    /// Returns the number of marked ordinals.
    ///
    /// This walks every word, and under concurrent marking the result is a lower bound.
    pub fn count(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire).count_ones() as usize)
            .sum()
    }

    /// Returns `true` if no ordinal has been marked.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| w.load(Ordering::Acquire) == 0)
    }

    /// Iterates over the marked ordinals in ascending order.
    ///
    /// Each word is loaded once; marks that land in an already visited word are not
    /// reported.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, word)| {
            let mut bits = word.load(Ordering::Acquire);
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let pos = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * 64 + pos)
            })
        })
    }

    fn locate(&self, ordinal: usize) -> (&AtomicU64, u64) {
        assert!(
            ordinal < self.capacity,
            "ordinal {ordinal} is out of range for a visitation set of capacity {}",
            self.capacity
        );
        (&self.words[ordinal >> 6], 1 << (ordinal & 63))
    }
}

impl std::fmt::Debug for VisitationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitationSet")
            .field("capacity", &self.capacity)
            .field("count", &self.count())
            .finish()
    }
}
