//! Sequence Barrier Implementation
//!
//! A barrier binds one consumer to one producer cursor and one wait strategy.
//! It answers the only question the consumer asks: which is the highest
//! sequence it may read right now. It also carries the alert flag used to
//! cancel a blocked consumer.

use crate::disruptor::{DisruptorError, Result, Sequence, WaitStrategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Coordination barrier between the producer cursor and a consumer
#[derive(Debug)]
pub struct SequenceBarrier {
    /// The producer's published sequence
    cursor: Arc<Sequence>,
    wait_strategy: Arc<dyn WaitStrategy>,
    alerted: AtomicBool,
}

impl SequenceBarrier {
    /// Create a new sequence barrier
    pub fn new(cursor: Arc<Sequence>, wait_strategy: Arc<dyn WaitStrategy>) -> Self {
        Self {
            cursor,
            wait_strategy,
            alerted: AtomicBool::new(false),
        }
    }

    /// Wait for the given sequence to become available
    ///
    /// Returns the highest published sequence, which may exceed `sequence`;
    /// the caller may consume everything up to it as one batch.
    ///
    /// # Errors
    /// `DisruptorError::Alert` if the barrier was alerted, or whatever the
    /// wait strategy reports (e.g. `DisruptorError::Timeout`)
    pub fn wait_for(&self, sequence: i64) -> Result<i64> {
        self.check_alert()?;
        self.wait_strategy.wait_for(sequence, &self.cursor, self)
    }

    /// Get the cursor sequence that this barrier is tracking
    pub fn get_cursor(&self) -> Arc<Sequence> {
        Arc::clone(&self.cursor)
    }

    /// Check if this barrier has been alerted
    pub fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }

    /// Alert this barrier and wake any thread blocked on it
    pub fn alert(&self) {
        self.alerted.store(true, Ordering::Release);
        self.wait_strategy.signal_all_when_blocking();
    }

    /// Clear the alert status
    pub fn clear_alert(&self) {
        self.alerted.store(false, Ordering::Release);
    }

    /// Fail with `DisruptorError::Alert` if the barrier is alerted
    pub fn check_alert(&self) -> Result<()> {
        if self.is_alerted() {
            Err(DisruptorError::Alert)
        } else {
            Ok(())
        }
    }
}
