//! Property-based tests for disruptor components
//!
//! These tests use proptest to verify properties that should hold for all inputs

use crate::disruptor::{
    event_factory::{ClosureEventFactory, DefaultEventFactory},
    is_power_of_two,
    ring_buffer::RingBuffer,
    sequence::Sequence,
    sequencer::{Sequencer, SingleProducerSequencer},
    wait_strategy::BusySpinWaitStrategy,
    DisruptorError,
};
use proptest::prelude::*;
use std::cell::Cell;
use std::sync::Arc;

/// Property tests for Sequence
mod sequence_properties {
    use super::*;

    proptest! {
        #[test]
        fn sequence_get_set_consistency(value in any::<i64>()) {
            let seq = Sequence::new(0);
            seq.set(value);
            prop_assert_eq!(seq.get(), value);
            seq.set_ordered(value.wrapping_add(1));
            prop_assert_eq!(seq.get(), value.wrapping_add(1));
        }

        #[test]
        fn sequence_monotonic_ordered_stores(increments in prop::collection::vec(1i64..100, 1..50)) {
            let seq = Sequence::default();
            let mut expected = -1;

            for inc in increments {
                expected += inc;
                seq.set_ordered(expected);
                prop_assert_eq!(seq.get(), expected);
            }
        }
    }
}

/// Property tests for `RingBuffer`
mod ring_buffer_properties {
    use super::*;

    proptest! {
        #[test]
        fn ring_buffer_accepts_only_powers_of_two(size in 0usize..5000) {
            let calls = Cell::new(0usize);
            let factory = ClosureEventFactory::new(|| {
                calls.set(calls.get() + 1);
                0i64
            });

            match RingBuffer::new(size, factory) {
                Ok(buffer) => {
                    prop_assert!(is_power_of_two(size));
                    prop_assert_eq!(buffer.buffer_size(), size);
                    prop_assert_eq!(calls.get(), size);
                }
                Err(e) => {
                    prop_assert!(!is_power_of_two(size));
                    prop_assert_eq!(e, DisruptorError::InvalidBufferSize(size));
                    prop_assert_eq!(calls.get(), 0);
                }
            }
        }

        #[test]
        fn ring_buffer_sequences_one_lap_apart_share_a_slot(
            size_power in 0u32..10,
            sequence in 0i64..(i64::MAX / 2),
            value in any::<i64>()
        ) {
            let size = 1usize << size_power;
            let mut buffer = RingBuffer::new(size, DefaultEventFactory::<i64>::new()).unwrap();

            *buffer.get_mut(sequence) = value;
            // SAFETY: single-threaded; the mutable borrow above has ended.
            let (same, next_lap) =
                unsafe { (*buffer.get(sequence), *buffer.get(sequence + size as i64)) };
            prop_assert_eq!(same, value);
            prop_assert_eq!(next_lap, value);
        }
    }
}

/// Property tests for `SingleProducerSequencer`
mod sequencer_properties {
    use super::*;

    fn sequencer(size: usize) -> (SingleProducerSequencer, Arc<Sequence>) {
        let mut sequencer =
            SingleProducerSequencer::new(size, Arc::new(BusySpinWaitStrategy::new())).unwrap();
        let consumer = Arc::new(Sequence::default());
        sequencer.set_consumer_sequence(Arc::clone(&consumer));
        (sequencer, consumer)
    }

    proptest! {
        #[test]
        fn claims_are_contiguous(
            size_power in 3u32..10,
            claims in prop::collection::vec(1i64..8, 1..100)
        ) {
            let size = 1usize << size_power;
            let (mut sequencer, consumer) = sequencer(size);
            let mut expected_high = -1i64;

            for n in claims {
                let high = sequencer.next_n(n).unwrap();
                expected_high += n;
                prop_assert_eq!(high, expected_high);

                sequencer.publish(high);
                prop_assert_eq!(sequencer.get_cursor().get(), high);
                // Consume immediately so the producer never waits.
                consumer.set_ordered(high);
            }
        }

        #[test]
        fn try_next_never_laps_the_consumer(
            size_power in 1u32..8,
            consumed in 0usize..256,
            attempts in 1usize..600
        ) {
            let size = 1usize << size_power;
            let (mut sequencer, consumer) = sequencer(size);
            let consumed = (consumed as i64).min(attempts as i64) - 1;
            consumer.set_ordered(consumed);

            let mut highest = -1i64;
            for _ in 0..attempts {
                match sequencer.try_next() {
                    Ok(sequence) => {
                        prop_assert!(sequence - (size as i64) <= consumed);
                        highest = sequence;
                    }
                    Err(e) => {
                        prop_assert_eq!(e, DisruptorError::InsufficientCapacity);
                        break;
                    }
                }
            }

            prop_assert_eq!(highest, (consumed + size as i64).min(attempts as i64 - 1));
            prop_assert_eq!(sequencer.remaining_capacity(), consumed + size as i64 - highest);
        }

        #[test]
        fn invalid_claim_sizes_are_rejected(size_power in 0u32..10, n in any::<i64>()) {
            let size = 1usize << size_power;
            let (mut sequencer, _consumer) = sequencer(size);

            let result = sequencer.try_next_n(n);
            if n >= 1 && n <= size as i64 {
                prop_assert_eq!(result, Ok(n - 1));
            } else {
                prop_assert_eq!(result, Err(DisruptorError::InvalidClaimSize(n)));
                prop_assert_eq!(sequencer.claimed_sequence(), -1);
            }
        }
    }
}
