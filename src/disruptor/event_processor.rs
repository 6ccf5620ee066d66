//! Event Processor implementation
//!
//! Event processors handle the consumption of events from the ring buffer.
//! The batch processor waits on a sequence barrier, hands every newly
//! available event to its handler and then advances its own sequence once for
//! the whole batch.

use crate::disruptor::{
    DefaultExceptionHandler, DisruptorError, EventHandler, ExceptionHandler, Result, RingBuffer,
    Sequence, SequenceBarrier,
};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

const IDLE: u8 = 0;
const HALTED: u8 = 1;
const RUNNING: u8 = 2;

/// Trait for event processors
pub trait EventProcessor: Send {
    /// Get the sequence being tracked by this processor
    fn get_sequence(&self) -> Arc<Sequence>;

    /// Halt the event processor
    fn halt(&self);

    /// Check if the processor is running
    fn is_running(&self) -> bool;

    /// Run the event processor on the calling thread until halted
    ///
    /// `&mut self` already rules out two overlapping runs. A processor whose
    /// handler panicked out of an earlier `run` is left Running and refuses
    /// to run again with `DisruptorError::AlreadyRunning`.
    fn run(&mut self) -> Result<()>;
}

/// Cloneable control handle for a processor running on another thread
#[derive(Debug, Clone)]
pub struct ProcessorHandle {
    state: Arc<AtomicU8>,
    sequence: Arc<Sequence>,
    sequence_barrier: Arc<SequenceBarrier>,
}

impl ProcessorHandle {
    /// Stop the processor; a blocked wait returns immediately
    pub fn halt(&self) {
        self.state.store(HALTED, Ordering::Release);
        self.sequence_barrier.alert();
    }

    /// Check if the processor is running
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// The processor's sequence: the highest sequence it has fully handled
    pub fn sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.sequence)
    }
}

/// Batch event processor
///
/// A processor may be run again after it halts; it resumes from its own
/// sequence.
pub struct BatchEventProcessor<T, H> {
    sequence: Arc<Sequence>,
    sequence_barrier: Arc<SequenceBarrier>,
    ring_buffer: Arc<RingBuffer<T>>,
    event_handler: H,
    state: Arc<AtomicU8>,
    exception_handler: Box<dyn ExceptionHandler<T>>,
}

impl<T, H> BatchEventProcessor<T, H>
where
    T: Send + Sync + 'static,
    H: EventHandler<T>,
{
    /// Create a new batch event processor
    ///
    /// Crate-private: the barrier must belong to the sequencer of the only
    /// producer writing `ring_buffer`, which [`DisruptorBuilder`] guarantees.
    ///
    /// [`DisruptorBuilder`]: crate::disruptor::DisruptorBuilder
    pub(crate) fn new(
        ring_buffer: Arc<RingBuffer<T>>,
        sequence_barrier: SequenceBarrier,
        event_handler: H,
    ) -> Self {
        Self {
            sequence: Arc::new(Sequence::default()),
            sequence_barrier: Arc::new(sequence_barrier),
            ring_buffer,
            event_handler,
            state: Arc::new(AtomicU8::new(IDLE)),
            exception_handler: Box::new(DefaultExceptionHandler::new()),
        }
    }

    /// Replace the exception handler
    pub fn set_exception_handler(&mut self, exception_handler: Box<dyn ExceptionHandler<T>>) {
        self.exception_handler = exception_handler;
    }

    /// A control handle usable from other threads
    pub fn handle(&self) -> ProcessorHandle {
        ProcessorHandle {
            state: Arc::clone(&self.state),
            sequence: Arc::clone(&self.sequence),
            sequence_barrier: Arc::clone(&self.sequence_barrier),
        }
    }

    /// Get the event handler
    pub fn event_handler(&self) -> &H {
        &self.event_handler
    }

    /// Consume the processor, returning its event handler
    pub fn into_handler(self) -> H {
        self.event_handler
    }

    fn process_events(&mut self) -> Result<()> {
        let mut next_sequence = self.sequence.get() + 1;

        while self.state.load(Ordering::Acquire) == RUNNING {
            match self.sequence_barrier.wait_for(next_sequence) {
                Ok(available_sequence) => {
                    if available_sequence < next_sequence {
                        continue;
                    }

                    trace!(next_sequence, available_sequence, "processing batch");
                    self.process_batch(next_sequence, available_sequence);
                    self.sequence.set_ordered(available_sequence);
                    next_sequence = available_sequence + 1;
                }
                Err(DisruptorError::Timeout) => self.notify_timeout(self.sequence.get()),
                Err(DisruptorError::Alert) => {
                    if self.state.load(Ordering::Acquire) != RUNNING {
                        break;
                    }
                    return Err(DisruptorError::Alert);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn process_batch(&mut self, start_sequence: i64, end_sequence: i64) {
        for sequence in start_sequence..=end_sequence {
            // SAFETY: the barrier returned `end_sequence`, so every slot up to
            // it is published, and the producer cannot reclaim it until this
            // processor's sequence moves past it.
            let event = unsafe { self.ring_buffer.get(sequence) };
            if let Err(e) = self
                .event_handler
                .on_event(event, sequence, sequence == end_sequence)
            {
                self.exception_handler
                    .handle_event_exception(e, sequence, event);
            }
        }
    }

    fn notify_timeout(&mut self, sequence: i64) {
        if let Err(e) = self.event_handler.on_timeout(sequence) {
            warn!(sequence, error = %e, "event handler failed on timeout");
        }
    }

    fn notify_start(&mut self) {
        if let Err(e) = self.event_handler.on_start() {
            self.exception_handler.handle_on_start_exception(e);
        }
    }

    fn notify_shutdown(&mut self) {
        if let Err(e) = self.event_handler.on_shutdown() {
            self.exception_handler.handle_on_shutdown_exception(e);
        }
    }
}

impl<T, H> EventProcessor for BatchEventProcessor<T, H>
where
    T: Send + Sync + 'static,
    H: EventHandler<T>,
{
    fn get_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.sequence)
    }

    fn halt(&self) {
        self.state.store(HALTED, Ordering::Release);
        self.sequence_barrier.alert();
    }

    fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    fn run(&mut self) -> Result<()> {
        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(RUNNING) => return Err(DisruptorError::AlreadyRunning),
            Err(_) => {
                // Halted before it ever ran.
                self.notify_start();
                self.notify_shutdown();
                self.state.store(IDLE, Ordering::Release);
                return Ok(());
            }
        }

        self.sequence_barrier.clear_alert();
        debug!(sequence = self.sequence.get(), "batch event processor started");
        self.notify_start();

        let result = self.process_events();

        self.notify_shutdown();
        self.state.store(IDLE, Ordering::Release);
        debug!(sequence = self.sequence.get(), "batch event processor stopped");

        result
    }
}

impl<T, H> std::fmt::Debug for BatchEventProcessor<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEventProcessor")
            .field("sequence", &self.sequence.get())
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish()
    }
}
