//! Sequencer Implementation
//!
//! The sequencer owns the producer side of the protocol: it hands out sequence
//! numbers, refuses to let the producer lap the consumer, and publishes
//! completed ranges by advancing the cursor the consumer's barrier watches.

use crate::disruptor::{
    is_power_of_two, DisruptorError, Result, Sequence, SequenceBarrier, WaitStrategy,
    INITIAL_CURSOR_VALUE,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Default backoff between consumer-sequence checks while the ring is full
const DEFAULT_PARK_DURATION: Duration = Duration::from_nanos(1);

/// Producer-side claim/publish capability
///
/// Claims take `&mut self`: a sequencer is owned by exactly one producer. A
/// multi-producer sequencer would be a separate implementor of this trait.
pub trait Sequencer: Send + std::fmt::Debug {
    /// Get the producer's published cursor
    fn get_cursor(&self) -> Arc<Sequence>;

    /// Get the size of the ring buffer this sequencer guards
    fn get_buffer_size(&self) -> usize;

    /// Claim the next sequence number, waiting for capacity if needed
    fn next(&mut self) -> Result<i64> {
        self.next_n(1)
    }

    /// Claim the next `n` sequence numbers, waiting for capacity if needed
    ///
    /// Returns the highest claimed sequence; the claimed range is
    /// `hi - n + 1 ..= hi`.
    ///
    /// # Errors
    /// `InvalidClaimSize` if `n` is not within `1..=buffer_size`,
    /// `ConsumerNotAttached` if capacity must be checked but no consumer
    /// sequence was set
    fn next_n(&mut self, n: i64) -> Result<i64>;

    /// Claim the next sequence number without waiting
    fn try_next(&mut self) -> Result<i64> {
        self.try_next_n(1)
    }

    /// Claim the next `n` sequence numbers without waiting
    ///
    /// # Errors
    /// As [`Sequencer::next_n`], plus `InsufficientCapacity` when the claim
    /// would overwrite events the consumer has not processed
    fn try_next_n(&mut self, n: i64) -> Result<i64>;

    /// Publish a sequence, making it and every earlier claimed sequence
    /// visible to the consumer
    ///
    /// Sequences must be published in increasing order.
    fn publish(&self, sequence: i64);

    /// Publish a claimed range; only `high` is stored
    fn publish_range(&self, low: i64, high: i64);

    /// Create a barrier for a consumer of this sequencer
    fn new_barrier(&self) -> SequenceBarrier;

    /// Number of slots the producer can claim before it would have to wait
    fn remaining_capacity(&self) -> i64;
}

/// Single producer sequencer
///
/// `next_value` and `cached_value` are plain fields: only the producer thread
/// touches them. The only shared state is the cursor (written here, read by the
/// consumer) and the consumer sequence (written by the consumer, read here).
#[derive(Debug)]
pub struct SingleProducerSequencer {
    buffer_size: usize,
    wait_strategy: Arc<dyn WaitStrategy>,
    cursor: Arc<Sequence>,
    consumer_sequence: Option<Arc<Sequence>>,
    /// Highest sequence claimed so far
    next_value: i64,
    /// Lower bound on the consumer's progress, refreshed only at the wrap point
    cached_value: i64,
    park_duration: Duration,
}

impl SingleProducerSequencer {
    /// Create a new single producer sequencer
    ///
    /// # Errors
    /// Returns `DisruptorError::InvalidBufferSize` if `buffer_size` is not a
    /// power of 2
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }

        Ok(Self {
            buffer_size,
            wait_strategy,
            cursor: Arc::new(Sequence::default()),
            consumer_sequence: None,
            next_value: INITIAL_CURSOR_VALUE,
            cached_value: INITIAL_CURSOR_VALUE,
            park_duration: DEFAULT_PARK_DURATION,
        })
    }

    /// Set how long the producer parks between checks while the ring is full
    pub fn with_park_duration(mut self, park_duration: Duration) -> Self {
        self.park_duration = park_duration;
        self
    }

    /// Attach the sequence of the consumer this producer must not lap
    pub fn set_consumer_sequence(&mut self, consumer_sequence: Arc<Sequence>) {
        self.consumer_sequence = Some(consumer_sequence);
    }

    /// Highest sequence claimed so far
    pub fn claimed_sequence(&self) -> i64 {
        self.next_value
    }

    fn validate_claim(&self, n: i64) -> Result<()> {
        if n < 1 || n > self.buffer_size as i64 {
            return Err(DisruptorError::InvalidClaimSize(n));
        }
        Ok(())
    }

    fn consumer(&self) -> Result<&Sequence> {
        self.consumer_sequence
            .as_deref()
            .ok_or(DisruptorError::ConsumerNotAttached)
    }
}

impl Sequencer for SingleProducerSequencer {
    fn get_cursor(&self) -> Arc<Sequence> {
        Arc::clone(&self.cursor)
    }

    fn get_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn next_n(&mut self, n: i64) -> Result<i64> {
        self.validate_claim(n)?;

        let next_sequence = self.next_value + n;
        let wrap_point = next_sequence - self.buffer_size as i64;

        if wrap_point > self.cached_value {
            let consumer = self.consumer()?;
            trace!(wrap_point, next_sequence, "ring full, waiting for consumer");

            let mut min_sequence;
            while {
                min_sequence = consumer.get();
                wrap_point > min_sequence
            } {
                thread::park_timeout(self.park_duration);
            }

            self.cached_value = min_sequence;
        }

        self.next_value = next_sequence;
        Ok(next_sequence)
    }

    fn try_next_n(&mut self, n: i64) -> Result<i64> {
        self.validate_claim(n)?;

        let next_sequence = self.next_value + n;
        let wrap_point = next_sequence - self.buffer_size as i64;

        if wrap_point > self.cached_value {
            let min_sequence = self.consumer()?.get();
            self.cached_value = min_sequence;
            if wrap_point > min_sequence {
                return Err(DisruptorError::InsufficientCapacity);
            }
        }

        self.next_value = next_sequence;
        Ok(next_sequence)
    }

    fn publish(&self, sequence: i64) {
        self.cursor.set_ordered(sequence);
        self.wait_strategy.signal_all_when_blocking();
    }

    fn publish_range(&self, _low: i64, high: i64) {
        self.publish(high);
    }

    fn new_barrier(&self) -> SequenceBarrier {
        SequenceBarrier::new(Arc::clone(&self.cursor), Arc::clone(&self.wait_strategy))
    }

    fn remaining_capacity(&self) -> i64 {
        let consumed = self
            .consumer_sequence
            .as_ref()
            .map_or(self.cached_value, |consumer| consumer.get());
        self.buffer_size as i64 - (self.next_value - consumed)
    }
}
