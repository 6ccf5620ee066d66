//! Backpressure and wake-up tests
//!
//! The producer must never lap the consumer, and a consumer blocked on an
//! empty ring must wake as soon as a single event is published.

use ringbatch::disruptor::{
    BlockingWaitStrategy, DefaultEventFactory, DisruptorBuilder, DisruptorError, EventHandler,
    Result, Sequence, Sequencer, SingleProducerSequencer,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Payload {
    value: i64,
}

/// Handler that sleeps on every event to keep the ring full
struct SlowHandler {
    delay: Duration,
    count: Arc<AtomicI64>,
}

impl EventHandler<Payload> for SlowHandler {
    fn on_event(&mut self, event: &Payload, sequence: i64, _end_of_batch: bool) -> Result<()> {
        assert_eq!(event.value, sequence);
        thread::sleep(self.delay);
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
    }
}

#[test]
fn test_producer_never_laps_slow_consumer() {
    const CAPACITY: i64 = 4;

    let count = Arc::new(AtomicI64::new(0));
    let (mut producer, consumer) =
        DisruptorBuilder::new(CAPACITY as usize, DefaultEventFactory::<Payload>::new())
            .start(SlowHandler {
                delay: Duration::from_millis(1),
                count: Arc::clone(&count),
            })
            .unwrap();

    let mut last = -1;
    for _ in 0..64 {
        last = producer
            .publish_event(|event, sequence| event.value = sequence)
            .unwrap();
        // The consumer's sequence only grows, so this bound holds after the
        // claim returned.
        assert!(last - consumer.sequence() <= CAPACITY);
    }

    consumer.wait_until_processed(last).unwrap();
    consumer.shutdown().unwrap();
    assert_eq!(count.load(Ordering::Acquire), 64);
}

#[test]
fn test_claim_blocks_until_consumer_reaches_wrap_point() {
    let mut sequencer =
        SingleProducerSequencer::new(16, Arc::new(BlockingWaitStrategy::new())).unwrap();
    let consumer = Arc::new(Sequence::default());
    sequencer.set_consumer_sequence(Arc::clone(&consumer));

    // Fill the ring and publish it all.
    let high = sequencer.next_n(16).unwrap();
    sequencer.publish(high);
    assert_eq!(sequencer.try_next(), Err(DisruptorError::InsufficientCapacity));

    let claimed = Arc::new(AtomicBool::new(false));
    let producer = {
        let claimed = Arc::clone(&claimed);
        thread::spawn(move || {
            // Sequence 17 needs the consumer at 1.
            let sequence = sequencer.next_n(2).unwrap();
            claimed.store(true, Ordering::Release);
            sequence
        })
    };

    thread::sleep(Duration::from_millis(20));
    assert!(!claimed.load(Ordering::Acquire));

    consumer.set_ordered(0);
    thread::sleep(Duration::from_millis(20));
    assert!(!claimed.load(Ordering::Acquire));

    consumer.set_ordered(1);
    assert_eq!(producer.join().unwrap(), 17);
}

#[test]
fn test_blocked_consumer_wakes_on_single_publish() {
    let count = Arc::new(AtomicI64::new(0));
    let (mut producer, consumer) = DisruptorBuilder::new(8, DefaultEventFactory::<Payload>::new())
        .wait_strategy(BlockingWaitStrategy::new())
        .start(SlowHandler {
            delay: Duration::ZERO,
            count: Arc::clone(&count),
        })
        .unwrap();

    // Give the consumer time to block on the empty ring.
    thread::sleep(Duration::from_millis(50));
    assert!(consumer.is_running());
    assert_eq!(consumer.sequence(), -1);

    let started = Instant::now();
    let sequence = producer
        .publish_event(|event, sequence| event.value = sequence)
        .unwrap();
    consumer.wait_until_processed(sequence).unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(count.load(Ordering::Acquire), 1);
    consumer.shutdown().unwrap();
}

#[test]
fn test_shutdown_while_blocked_returns_handler() {
    let count = Arc::new(AtomicI64::new(0));
    let (_producer, consumer) = DisruptorBuilder::new(8, DefaultEventFactory::<Payload>::new())
        .start(SlowHandler {
            delay: Duration::ZERO,
            count: Arc::clone(&count),
        })
        .unwrap();

    thread::sleep(Duration::from_millis(20));
    let handle = consumer.handle();
    let handler = consumer.shutdown().unwrap();

    assert!(!handle.is_running());
    assert_eq!(handle.sequence().get(), -1);
    assert_eq!(handler.count.load(Ordering::Acquire), 0);
}
