//! Sequence implementation for the Disruptor
//!
//! A Sequence tracks progress through the ring buffer. The producer cursor and
//! the consumer position are both Sequences; each is written by exactly one
//! thread and read by the other, so all coordination happens through the
//! memory orderings chosen here.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicI64, Ordering};

/// A cache-line padded sequence number
///
/// Padding keeps the producer cursor and the consumer sequence on separate
/// cache lines so the two threads do not false-share.
pub struct Sequence {
    value: CachePadded<AtomicI64>,
}

impl Sequence {
    /// Create a new sequence with the given initial value
    pub fn new(initial_value: i64) -> Self {
        Self {
            value: CachePadded::new(AtomicI64::new(initial_value)),
        }
    }

    /// Get the current sequence value
    ///
    /// Acquire load: every write performed before the matching store is
    /// visible once the stored value is observed.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Set the sequence value with a full fence
    ///
    /// Used at initialization and for infrequent updates.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Set the sequence value with release semantics only
    ///
    /// This is the hot-path store used by `publish` and by the batch
    /// processor. It orders all prior writes before the store without paying
    /// for a full fence.
    #[inline]
    pub fn set_ordered(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(crate::disruptor::INITIAL_CURSOR_VALUE)
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("value", &self.get())
            .finish()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}
