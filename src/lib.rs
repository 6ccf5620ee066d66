//! `RingBatch` - Single Producer, Single Consumer Disruptor
//!
//! A Rust implementation of the LMAX Disruptor pattern for one producer thread
//! and one consumer thread exchanging events through a pre-allocated ring.
//!
//! ## Features
//!
//! - **Lock-free data path**: publication is a release store, observation an
//!   acquire load; slot contents are never locked
//! - **Zero-allocation**: every event is allocated once, when the ring is built
//! - **Batching**: the consumer handles everything published since its last
//!   wake-up and advances its sequence once per batch
//! - **Backpressure**: the producer never overwrites an unconsumed event
//! - **Pluggable waiting**: blocking, timeout-blocking, yielding, sleeping or
//!   busy-spin consumers
//!
//! ## Quick Start
//!
//! ```rust
//! use ringbatch::disruptor::{
//!     BlockingWaitStrategy, DefaultEventFactory, DisruptorBuilder, EventHandler, Result,
//! };
//!
//! // Define your event type
//! #[derive(Debug, Default)]
//! struct MyEvent {
//!     value: i64,
//! }
//!
//! // Implement an event handler
//! #[derive(Default)]
//! struct MyEventHandler {
//!     total: i64,
//! }
//!
//! impl EventHandler<MyEvent> for MyEventHandler {
//!     fn on_event(&mut self, event: &MyEvent, _sequence: i64, _end_of_batch: bool) -> Result<()> {
//!         self.total += event.value;
//!         Ok(())
//!     }
//! }
//!
//! let (mut producer, consumer) = DisruptorBuilder::new(1024, DefaultEventFactory::<MyEvent>::new())
//!     .wait_strategy(BlockingWaitStrategy::new())
//!     .start(MyEventHandler::default())
//!     .unwrap();
//!
//! let mut last = -1;
//! for i in 0..10 {
//!     last = producer.publish_event(|event, _sequence| event.value = i).unwrap();
//! }
//!
//! consumer.wait_until_processed(last).unwrap();
//! let handler = consumer.shutdown().unwrap();
//! assert_eq!(handler.total, 45);
//! ```
//!
//! ## Architecture
//!
//! - **`Sequence`**: padded atomic counter with acquire, full-fence and
//!   release stores
//! - **`RingBuffer`**: pre-allocated power-of-two slot array
//! - **`SingleProducerSequencer`**: claim/publish protocol with backpressure
//! - **`SequenceBarrier`**: the consumer's view of the producer cursor
//! - **`WaitStrategy`**: how the consumer waits and how the producer wakes it
//! - **`BatchEventProcessor`**: the consumer loop driving an `EventHandler`
//! - **`DisruptorBuilder`**: wires everything and starts the consumer thread

pub mod disruptor;

// Re-export the main types for convenience
pub use disruptor::{
    // Utility functions
    is_power_of_two,
    BatchEventProcessor,
    BlockingWaitStrategy,
    BusySpinWaitStrategy,
    ClosureEventFactory,
    ClosureEventHandler,
    Consumer,
    DefaultEventFactory,
    DisruptorBuilder,
    DisruptorConfig,
    // Error types
    DisruptorError,
    EventFactory,
    EventHandler,
    EventProcessor,
    ExceptionHandler,
    Producer,
    Result,
    RingBuffer,
    Sequence,
    SequenceBarrier,
    Sequencer,
    SingleProducerSequencer,
    SleepingWaitStrategy,
    TimeoutBlockingWaitStrategy,
    WaitStrategy,
    WaitStrategyKind,
    YieldingWaitStrategy,
    // Constants
    INITIAL_CURSOR_VALUE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version of the `RingBatch` library
#[must_use]
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
