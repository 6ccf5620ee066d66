//! Builder module for wiring a disruptor
//!
//! Creates the ring buffer, the sequencer, the barrier and the batch
//! processor, connects the consumer sequence to the sequencer for
//! backpressure, and starts the consumer on its own thread.
//!
//! ```
//! use ringbatch::disruptor::{ClosureEventHandler, DefaultEventFactory, DisruptorBuilder, Result};
//!
//! let (mut producer, consumer) = DisruptorBuilder::new(16, DefaultEventFactory::<i64>::new())
//!     .thread_name("doc-consumer")
//!     .start(ClosureEventHandler::new(
//!         |_event: &i64, _sequence: i64, _end_of_batch: bool| -> Result<()> { Ok(()) },
//!     ))
//!     .unwrap();
//!
//! let last = producer.publish_event(|event, sequence| *event = sequence).unwrap();
//! consumer.wait_until_processed(last).unwrap();
//! consumer.shutdown().unwrap();
//! ```

use crate::disruptor::{
    BatchEventProcessor, BlockingWaitStrategy, DisruptorConfig, DisruptorError, EventFactory,
    EventHandler, EventProcessor, ExceptionHandler, ManagedThread, ProcessorHandle, Producer,
    Result, RingBuffer, Sequencer, SingleProducerSequencer, ThreadBuilder, WaitStrategy,
};
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Builder for a single producer, single consumer disruptor
pub struct DisruptorBuilder<T, F> {
    buffer_size: usize,
    event_factory: F,
    wait_strategy: Arc<dyn WaitStrategy>,
    producer_park: Option<Duration>,
    thread_name: String,
    core_id: Option<usize>,
    exception_handler: Option<Box<dyn ExceptionHandler<T>>>,
    _event: PhantomData<fn() -> T>,
}

impl<T, F> DisruptorBuilder<T, F>
where
    T: Send + Sync + 'static,
    F: EventFactory<T>,
{
    /// Start a builder with a blocking wait strategy
    pub fn new(buffer_size: usize, event_factory: F) -> Self {
        Self {
            buffer_size,
            event_factory,
            wait_strategy: Arc::new(BlockingWaitStrategy::new()),
            producer_park: None,
            thread_name: "batch-processor".to_string(),
            core_id: None,
            exception_handler: None,
            _event: PhantomData,
        }
    }

    /// Start a builder from a validated configuration
    pub fn from_config(config: &DisruptorConfig, event_factory: F) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::new(config.buffer_size, event_factory)
            .wait_strategy_arc(config.build_wait_strategy())
            .producer_park_duration(config.producer_park_duration())
            .thread_name(config.thread_name.clone());
        builder.core_id = config.core_id;
        Ok(builder)
    }

    /// Set the consumer wait strategy
    pub fn wait_strategy<W: WaitStrategy + 'static>(self, wait_strategy: W) -> Self {
        self.wait_strategy_arc(Arc::new(wait_strategy))
    }

    /// Set a shared consumer wait strategy
    pub fn wait_strategy_arc(mut self, wait_strategy: Arc<dyn WaitStrategy>) -> Self {
        self.wait_strategy = wait_strategy;
        self
    }

    /// Set the producer backoff while the ring is full
    pub fn producer_park_duration(mut self, park: Duration) -> Self {
        self.producer_park = Some(park);
        self
    }

    /// Name the consumer thread
    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Pin the consumer thread to a CPU core
    pub fn pin_at_core(mut self, core_id: usize) -> Self {
        self.core_id = Some(core_id);
        self
    }

    /// Replace the default logging exception handler
    pub fn exception_handler(mut self, handler: Box<dyn ExceptionHandler<T>>) -> Self {
        self.exception_handler = Some(handler);
        self
    }

    /// Build the disruptor and start consuming with `handler`
    ///
    /// # Errors
    /// `InvalidBufferSize` for a bad size, `Config` for an unavailable core,
    /// `Thread` if the consumer thread cannot be spawned
    pub fn start<H>(self, handler: H) -> Result<(Producer<T>, Consumer<H>)>
    where
        H: EventHandler<T> + 'static,
    {
        let ring_buffer = Arc::new(RingBuffer::new(self.buffer_size, self.event_factory)?);
        let mut sequencer =
            SingleProducerSequencer::new(self.buffer_size, Arc::clone(&self.wait_strategy))?;
        if let Some(park) = self.producer_park {
            sequencer = sequencer.with_park_duration(park);
        }

        let mut processor =
            BatchEventProcessor::new(Arc::clone(&ring_buffer), sequencer.new_barrier(), handler);
        if let Some(exception_handler) = self.exception_handler {
            processor.set_exception_handler(exception_handler);
        }
        sequencer.set_consumer_sequence(processor.get_sequence());
        let handle = processor.handle();

        let mut thread_builder = ThreadBuilder::new().thread_name(self.thread_name);
        if let Some(core_id) = self.core_id {
            thread_builder = thread_builder.pin_at_core(core_id)?;
        }

        let producer = Producer::new(ring_buffer, sequencer)?;
        let thread = thread_builder.spawn(move || {
            let result = processor.run();
            (processor.into_handler(), result)
        })?;

        debug!(
            buffer_size = self.buffer_size,
            thread = thread.thread_name(),
            "disruptor started"
        );

        Ok((
            producer,
            Consumer {
                handle,
                thread: Some(thread),
            },
        ))
    }
}

/// The consuming end of a started disruptor
///
/// Dropping a `Consumer` halts the processor and joins its thread.
#[derive(Debug)]
pub struct Consumer<H> {
    handle: ProcessorHandle,
    thread: Option<ManagedThread<(H, Result<()>)>>,
}

impl<H> Consumer<H> {
    /// The highest sequence the handler has fully processed
    pub fn sequence(&self) -> i64 {
        self.handle.sequence().get()
    }

    /// A control handle for the processor
    pub fn handle(&self) -> ProcessorHandle {
        self.handle.clone()
    }

    /// Check if the processor is running
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Wait until the handler has processed `sequence`
    ///
    /// # Errors
    /// `DisruptorError::Thread` if the consumer thread exits first
    pub fn wait_until_processed(&self, sequence: i64) -> Result<()> {
        let processed = self.handle.sequence();
        while processed.get() < sequence {
            if !self.thread.as_ref().is_some_and(ManagedThread::is_running) {
                return Err(DisruptorError::Thread(format!(
                    "consumer exited before processing sequence {sequence}"
                )));
            }
            thread::yield_now();
        }
        Ok(())
    }

    /// Halt the processor, join its thread and return the handler
    ///
    /// Events published but not yet consumed are not processed.
    ///
    /// # Errors
    /// The processor's own error, or `DisruptorError::Thread` if the consumer
    /// thread panicked
    pub fn shutdown(mut self) -> Result<H> {
        self.handle.halt();
        let thread = self
            .thread
            .take()
            .ok_or_else(|| DisruptorError::Thread("consumer already joined".to_string()))?;

        let (handler, result) = thread.join()?;
        result?;
        debug!(sequence = self.sequence(), "disruptor shut down");
        Ok(handler)
    }
}

impl<H> Drop for Consumer<H> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.handle.halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::{
        ClosureEventHandler, DefaultEventFactory, IgnoreExceptionHandler, WaitStrategyKind,
        YieldingWaitStrategy,
    };
    use std::sync::mpsc;

    #[derive(Debug, Default)]
    struct TestEvent {
        value: i64,
    }

    #[derive(Default)]
    struct SummingHandler {
        sum: i64,
        count: usize,
    }

    impl EventHandler<TestEvent> for SummingHandler {
        fn on_event(&mut self, event: &TestEvent, _sequence: i64, _end_of_batch: bool) -> Result<()> {
            self.sum += event.value;
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_start_publish_shutdown() {
        let (mut producer, consumer) = DisruptorBuilder::new(16, DefaultEventFactory::new())
            .wait_strategy(YieldingWaitStrategy::new())
            .thread_name("builder-test")
            .start(SummingHandler::default())
            .unwrap();

        let mut last = -1;
        for i in 0..100 {
            last = producer.publish_event(|event: &mut TestEvent, _| event.value = i).unwrap();
        }
        consumer.wait_until_processed(last).unwrap();
        assert_eq!(consumer.sequence(), 99);

        let handler = consumer.shutdown().unwrap();
        assert_eq!(handler.count, 100);
        assert_eq!(handler.sum, (0..100).sum::<i64>());
    }

    #[test]
    fn test_invalid_buffer_size() {
        let result = DisruptorBuilder::new(10, DefaultEventFactory::<TestEvent>::new())
            .start(SummingHandler::default());
        assert!(matches!(result, Err(DisruptorError::InvalidBufferSize(10))));
    }

    #[test]
    fn test_from_config() {
        let config = DisruptorConfig {
            buffer_size: 8,
            wait_strategy: WaitStrategyKind::TimeoutBlocking,
            timeout_ms: 5,
            thread_name: "configured".to_string(),
            ..DisruptorConfig::default()
        };

        let (mut producer, consumer) =
            DisruptorBuilder::from_config(&config, DefaultEventFactory::new())
                .unwrap()
                .exception_handler(Box::new(IgnoreExceptionHandler::new()))
                .start(SummingHandler::default())
                .unwrap();

        assert_eq!(producer.buffer_size(), 8);
        let last = producer
            .publish_events(8, |event: &mut TestEvent, sequence| event.value = sequence)
            .unwrap();
        consumer.wait_until_processed(last).unwrap();

        let handler = consumer.shutdown().unwrap();
        assert_eq!(handler.count, 8);
    }

    #[test]
    fn test_from_invalid_config() {
        let config = DisruptorConfig {
            buffer_size: 12,
            ..DisruptorConfig::default()
        };
        assert!(matches!(
            DisruptorBuilder::from_config(&config, DefaultEventFactory::<TestEvent>::new()),
            Err(DisruptorError::Config(_))
        ));
    }

    #[test]
    fn test_shutdown_without_events() {
        let (_producer, consumer) = DisruptorBuilder::new(4, DefaultEventFactory::<TestEvent>::new())
            .start(ClosureEventHandler::new(
                |_event: &TestEvent, _sequence: i64, _end_of_batch: bool| -> Result<()> { Ok(()) },
            ))
            .unwrap();

        assert!(consumer.shutdown().is_ok());
    }

    #[test]
    fn test_slot_under_read_is_never_reclaimed() {
        struct HoldingHandler {
            entered: mpsc::Sender<()>,
            release: mpsc::Receiver<()>,
            observed: Option<(i64, i64)>,
        }

        impl EventHandler<TestEvent> for HoldingHandler {
            fn on_event(&mut self, event: &TestEvent, sequence: i64, _end_of_batch: bool) -> Result<()> {
                if sequence == 0 {
                    let before = event.value;
                    self.entered.send(()).unwrap();
                    self.release.recv().unwrap();
                    self.observed = Some((before, event.value));
                }
                Ok(())
            }
        }

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let (mut producer, consumer) = DisruptorBuilder::new(4, DefaultEventFactory::new())
            .start(HoldingHandler {
                entered: entered_tx,
                release: release_rx,
                observed: None,
            })
            .unwrap();

        producer.publish_event(|event: &mut TestEvent, _| event.value = 100).unwrap();
        entered_rx.recv().unwrap();

        // The handler still holds a reference into slot 0.
        for value in 1..4 {
            producer.try_publish_event(|event, _| event.value = value).unwrap();
        }
        assert_eq!(
            producer.try_publish_event(|event, _| event.value = -1),
            Err(DisruptorError::InsufficientCapacity)
        );

        release_tx.send(()).unwrap();
        consumer.wait_until_processed(3).unwrap();
        let handler = consumer.shutdown().unwrap();
        assert_eq!(handler.observed, Some((100, 100)));
    }

    #[test]
    fn test_drop_consumer_stops_thread() {
        let (_producer, consumer) = DisruptorBuilder::new(4, DefaultEventFactory::<TestEvent>::new())
            .start(SummingHandler::default())
            .unwrap();
        let handle = consumer.handle();
        drop(consumer);
        assert!(!handle.is_running());
    }
}
