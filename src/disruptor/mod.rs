//! RingBatch Disruptor Implementation
//!
//! Single-producer/single-consumer event ring. A producer claims slots through
//! the [`SingleProducerSequencer`], writes them in place and publishes; a
//! [`BatchEventProcessor`] waits on a [`SequenceBarrier`] and hands every
//! newly available event to an [`EventHandler`] in batches.

pub mod builder;
pub mod config;
pub mod event_factory;
pub mod event_handler;
pub mod event_processor;
pub mod exception_handler;
pub mod producer;
pub mod ring_buffer;
pub mod sequence;
pub mod sequence_barrier;
pub mod sequencer;
pub mod thread_management;
pub mod wait_strategy;

#[cfg(test)]
mod property_tests;

pub use builder::{Consumer, DisruptorBuilder};
pub use config::{DisruptorConfig, WaitStrategyKind};
pub use event_factory::{ClosureEventFactory, DefaultEventFactory, EventFactory};
pub use event_handler::{ClosureEventHandler, EventHandler, NoOpEventHandler};
pub use event_processor::{BatchEventProcessor, EventProcessor, ProcessorHandle};
pub use exception_handler::{DefaultExceptionHandler, ExceptionHandler, IgnoreExceptionHandler};
pub use producer::Producer;
pub use ring_buffer::RingBuffer;
pub use sequence::Sequence;
pub use sequence_barrier::SequenceBarrier;
pub use sequencer::{Sequencer, SingleProducerSequencer};
pub use thread_management::{ManagedThread, ThreadBuilder};
pub use wait_strategy::{
    BlockingWaitStrategy, BusySpinWaitStrategy, SleepingWaitStrategy, TimeoutBlockingWaitStrategy,
    WaitStrategy, YieldingWaitStrategy,
};

/// The initial cursor value for sequences
pub const INITIAL_CURSOR_VALUE: i64 = -1;

/// Errors that can occur in the Disruptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisruptorError {
    #[error("Buffer size must be a power of 2, got: {0}")]
    InvalidBufferSize(usize),

    #[error("Claim size must be between 1 and the buffer size, got: {0}")]
    InvalidClaimSize(i64),

    #[error("Insufficient capacity in the ring buffer")]
    InsufficientCapacity,

    #[error("No consumer sequence attached to the sequencer")]
    ConsumerNotAttached,

    #[error("Timeout waiting for sequence")]
    Timeout,

    #[error("Sequence barrier alerted")]
    Alert,

    #[error("Event processor is already running")]
    AlreadyRunning,

    #[error("Event handler failed: {0}")]
    Handler(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Thread error: {0}")]
    Thread(String),
}

pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Utility function to check if a number is a power of 2
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}
