//! Producer facade
//!
//! Bundles the ring buffer with the single producer sequencer so publishing
//! code never touches raw slot pointers. The claim/write/publish steps are
//! still available one by one for callers that need them.

use crate::disruptor::{
    DisruptorError, Result, RingBuffer, Sequence, Sequencer, SingleProducerSequencer,
};
use std::sync::Arc;

/// The producing end of a disruptor
///
/// Not `Clone`: there is exactly one producer per ring. Producers are only
/// created by [`DisruptorBuilder::start`](crate::disruptor::DisruptorBuilder::start),
/// together with the one processor reading the same ring.
///
/// # Examples
/// ```
/// use ringbatch::disruptor::{DefaultEventFactory, DisruptorBuilder, NoOpEventHandler};
///
/// let (mut producer, consumer) = DisruptorBuilder::new(8, DefaultEventFactory::<i64>::new())
///     .start(NoOpEventHandler::new())
///     .unwrap();
///
/// let sequence = producer.publish_event(|event, sequence| *event = sequence * 2).unwrap();
/// assert_eq!(sequence, 0);
/// assert_eq!(producer.cursor(), 0);
/// consumer.shutdown().unwrap();
/// ```
///
/// A producer cannot be wired to a ring the caller still holds:
/// ```compile_fail,E0624
/// use ringbatch::disruptor::{
///     BlockingWaitStrategy, DefaultEventFactory, Producer, RingBuffer, SingleProducerSequencer,
/// };
/// use std::sync::Arc;
///
/// let ring_buffer = Arc::new(RingBuffer::new(8, DefaultEventFactory::<i64>::new()).unwrap());
/// let sequencer = SingleProducerSequencer::new(8, Arc::new(BlockingWaitStrategy::new())).unwrap();
/// let _producer = Producer::new(Arc::clone(&ring_buffer), sequencer);
/// ```
#[derive(Debug)]
pub struct Producer<T> {
    ring_buffer: Arc<RingBuffer<T>>,
    sequencer: SingleProducerSequencer,
    cursor: Arc<Sequence>,
}

impl<T> Producer<T> {
    /// Create a producer over a ring buffer and its sequencer
    ///
    /// The caller must not keep references into `ring_buffer` other than
    /// the processor gated by this sequencer's barrier.
    ///
    /// # Errors
    /// `DisruptorError::Config` if the two disagree on the buffer size
    pub(crate) fn new(
        ring_buffer: Arc<RingBuffer<T>>,
        sequencer: SingleProducerSequencer,
    ) -> Result<Self> {
        if ring_buffer.buffer_size() != sequencer.get_buffer_size() {
            return Err(DisruptorError::Config(format!(
                "ring buffer size {} does not match sequencer size {}",
                ring_buffer.buffer_size(),
                sequencer.get_buffer_size()
            )));
        }

        let cursor = sequencer.get_cursor();
        Ok(Self {
            ring_buffer,
            sequencer,
            cursor,
        })
    }

    /// Claim the next sequence, waiting while the ring is full
    pub fn next(&mut self) -> Result<i64> {
        self.sequencer.next()
    }

    /// Claim the next `n` sequences, returning the highest
    pub fn next_n(&mut self, n: i64) -> Result<i64> {
        self.sequencer.next_n(n)
    }

    /// Claim the next sequence or fail with `InsufficientCapacity`
    pub fn try_next(&mut self) -> Result<i64> {
        self.sequencer.try_next()
    }

    /// Claim the next `n` sequences or fail with `InsufficientCapacity`
    pub fn try_next_n(&mut self, n: i64) -> Result<i64> {
        self.sequencer.try_next_n(n)
    }

    /// Write access to a claimed, not yet published slot
    ///
    /// # Panics
    /// Panics if `sequence` was not claimed or has already been published;
    /// handing out that slot could alias a consumer read.
    pub fn get_mut(&mut self, sequence: i64) -> &mut T {
        assert!(
            sequence > self.cursor.get() && sequence <= self.sequencer.claimed_sequence(),
            "sequence {sequence} is not claimed and unpublished"
        );
        // SAFETY: the slot is claimed (so the consumer has released it) and
        // unpublished (so the consumer cannot read it); `&mut self` prevents a
        // second reference from this producer.
        unsafe { &mut *self.ring_buffer.get_mut_unchecked(sequence) }
    }

    /// Publish `sequence` and everything claimed before it
    pub fn publish(&self, sequence: i64) {
        debug_assert!(sequence <= self.sequencer.claimed_sequence());
        self.sequencer.publish(sequence);
    }

    /// Publish a claimed range
    pub fn publish_range(&self, low: i64, high: i64) {
        debug_assert!(low <= high);
        self.sequencer.publish_range(low, high);
    }

    /// Claim one slot, fill it with `update` and publish it
    pub fn publish_event<F>(&mut self, update: F) -> Result<i64>
    where
        F: FnOnce(&mut T, i64),
    {
        let sequence = self.next()?;
        update(self.get_mut(sequence), sequence);
        self.publish(sequence);
        Ok(sequence)
    }

    /// As [`Producer::publish_event`], failing instead of waiting for space
    pub fn try_publish_event<F>(&mut self, update: F) -> Result<i64>
    where
        F: FnOnce(&mut T, i64),
    {
        let sequence = self.try_next()?;
        update(self.get_mut(sequence), sequence);
        self.publish(sequence);
        Ok(sequence)
    }

    /// Claim `n` slots, fill each with `update` and publish them together
    ///
    /// Returns the highest published sequence.
    pub fn publish_events<F>(&mut self, n: i64, mut update: F) -> Result<i64>
    where
        F: FnMut(&mut T, i64),
    {
        let high = self.next_n(n)?;
        let low = high - n + 1;
        for sequence in low..=high {
            update(self.get_mut(sequence), sequence);
        }
        self.publish_range(low, high);
        Ok(high)
    }

    /// Number of slots claimable without waiting
    pub fn remaining_capacity(&self) -> i64 {
        self.sequencer.remaining_capacity()
    }

    /// The last published sequence
    pub fn cursor(&self) -> i64 {
        self.cursor.get()
    }

    /// The ring buffer size
    pub fn buffer_size(&self) -> usize {
        self.ring_buffer.buffer_size()
    }
}
