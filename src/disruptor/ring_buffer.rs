//! Ring Buffer Implementation
//!
//! The ring buffer is a pre-allocated circular array of events. Slots are
//! created once by an [`EventFactory`] and then mutated in place for the
//! lifetime of the buffer, so the hot path never allocates.

use crate::disruptor::{is_power_of_two, DisruptorError, EventFactory, Result};
use std::cell::UnsafeCell;

/// Pre-allocated circular array of events
///
/// Sequence `s` lives in slot `s & (buffer_size - 1)`. The buffer itself does
/// no ownership checking: the sequencer guarantees that the producer only
/// writes slots the consumer has released, and the barrier guarantees the
/// consumer only reads slots that have been published.
///
/// # Type Parameters
/// * `T` - The event type stored in the buffer
pub struct RingBuffer<T> {
    /// `Box<[UnsafeCell<T>]>` gives interior mutability with a fixed layout
    slots: Box<[UnsafeCell<T>]>,
    /// Mask for fast modulo operations (buffer_size - 1)
    index_mask: i64,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with the specified size and event factory
    ///
    /// The factory is called exactly `buffer_size` times.
    ///
    /// # Errors
    /// Returns `DisruptorError::InvalidBufferSize` if `buffer_size` is not a
    /// power of 2. No slot is created in that case.
    pub fn new<F>(buffer_size: usize, event_factory: F) -> Result<Self>
    where
        F: EventFactory<T>,
    {
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }

        let slots: Box<[UnsafeCell<T>]> = (0..buffer_size)
            .map(|_| UnsafeCell::new(event_factory.new_instance()))
            .collect();

        Ok(Self {
            slots,
            index_mask: (buffer_size - 1) as i64,
        })
    }

    #[inline]
    fn index(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    /// Get a shared reference to the event at the specified sequence
    ///
    /// # Safety
    /// `sequence` must be published and not yet reclaimed by the producer, and
    /// no `&mut T` to the same slot may exist while the reference is alive.
    /// A ring shared with a running [`Producer`](crate::disruptor::Producer)
    /// only satisfies this on the consumer side of the barrier.
    ///
    /// Reading a slot without that guarantee does not compile:
    /// ```compile_fail,E0133
    /// use ringbatch::disruptor::{DefaultEventFactory, RingBuffer};
    ///
    /// let ring_buffer = RingBuffer::new(8, DefaultEventFactory::<i64>::new()).unwrap();
    /// let _event = ring_buffer.get(0);
    /// ```
    #[inline]
    pub unsafe fn get(&self, sequence: i64) -> &T {
        &*self.slots.get_unchecked(self.index(sequence)).get()
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, sequence: i64) -> &mut T {
        let index = self.index(sequence);
        self.slots[index].get_mut()
    }

    /// Get a raw mutable pointer to the event at the specified sequence
    ///
    /// # Safety
    /// The caller must hold the claim for `sequence` (it was returned by the
    /// sequencer and not yet published) so that no other thread reads or
    /// writes the slot while the pointer is in use.
    #[inline]
    pub unsafe fn get_mut_unchecked(&self, sequence: i64) -> *mut T {
        self.slots.get_unchecked(self.index(sequence)).get()
    }

    /// Get the size of the buffer
    pub fn buffer_size(&self) -> usize {
        self.slots.len()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("buffer_size", &self.slots.len())
            .finish()
    }
}

// SAFETY: slot access is coordinated by the sequence protocol; a slot is only
// written by the producer before its sequence is published and only read by
// the consumer after observing that publication.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send + Sync> Sync for RingBuffer<T> {}
