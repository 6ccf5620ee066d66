//! Wait Strategy Implementation
//!
//! A wait strategy decides how a consumer waits for the producer cursor to
//! reach a sequence, and how the producer wakes it. Strategies only see the
//! cursor and the barrier, so a new one can be plugged in without touching the
//! sequencer, the barrier or the processor.

use crate::disruptor::{DisruptorError, Result, Sequence, SequenceBarrier};
use parking_lot::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Strategy for waiting for events to become available
pub trait WaitStrategy: Send + Sync + std::fmt::Debug {
    /// Wait until `cursor` reaches `sequence`
    ///
    /// # Arguments
    /// * `sequence` - The sequence the consumer needs next
    /// * `cursor` - The producer's published sequence
    /// * `barrier` - The barrier waiting; checked for alerts while blocked
    ///
    /// # Returns
    /// The cursor value observed, which may be higher than `sequence`
    ///
    /// # Errors
    /// `DisruptorError::Alert` if the barrier is alerted while waiting,
    /// `DisruptorError::Timeout` for strategies with a time bound
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64>;

    /// Wake any thread blocked in `wait_for`
    ///
    /// Must be a safe no-op when nobody is waiting. The blocking strategies
    /// still take their lock on every call.
    fn signal_all_when_blocking(&self);
}

/// Blocking wait strategy using a mutex and condition variable
///
/// The fast path (data already published) never touches the lock. The
/// producer's `publish` stores the cursor before taking the lock to notify,
/// and the waiter re-checks the cursor under the same lock, so a wake-up
/// cannot be lost.
#[derive(Debug, Default)]
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWaitStrategy {
    /// Create a new blocking wait strategy
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64> {
        let mut available_sequence = cursor.get();

        if available_sequence < sequence {
            let mut guard = self.mutex.lock();
            loop {
                available_sequence = cursor.get();
                if available_sequence >= sequence {
                    break;
                }
                barrier.check_alert()?;
                self.condvar.wait(&mut guard);
            }
        }

        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

/// Blocking wait strategy with an upper bound on each wait
///
/// Returns `DisruptorError::Timeout` when the cursor does not reach the
/// requested sequence in time; the processor reports the timeout to its
/// handler and waits again.
#[derive(Debug)]
pub struct TimeoutBlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
    timeout: Duration,
}

impl TimeoutBlockingWaitStrategy {
    /// Create a new timeout-bounded blocking wait strategy
    pub fn new(timeout: Duration) -> Self {
        Self {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
            timeout,
        }
    }

    /// The configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl WaitStrategy for TimeoutBlockingWaitStrategy {
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64> {
        let mut available_sequence = cursor.get();

        if available_sequence < sequence {
            let deadline = Instant::now() + self.timeout;
            let mut guard = self.mutex.lock();
            loop {
                available_sequence = cursor.get();
                if available_sequence >= sequence {
                    break;
                }
                barrier.check_alert()?;
                if self.condvar.wait_until(&mut guard, deadline).timed_out() {
                    available_sequence = cursor.get();
                    if available_sequence >= sequence {
                        break;
                    }
                    return Err(DisruptorError::Timeout);
                }
            }
        }

        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

/// Yielding wait strategy
///
/// Spins a bounded number of times, then yields the CPU on every retry.
#[derive(Debug)]
pub struct YieldingWaitStrategy {
    spin_tries: u32,
}

impl YieldingWaitStrategy {
    /// Create a new yielding wait strategy
    pub fn new() -> Self {
        Self { spin_tries: 100 }
    }
}

impl Default for YieldingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for YieldingWaitStrategy {
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64> {
        let mut counter = self.spin_tries;
        let mut available_sequence;

        while {
            available_sequence = cursor.get();
            available_sequence < sequence
        } {
            barrier.check_alert()?;
            if counter == 0 {
                thread::yield_now();
            } else {
                counter -= 1;
                std::hint::spin_loop();
            }
        }

        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}
}

/// Busy-spin wait strategy
///
/// Lowest latency; burns a full core while waiting.
#[derive(Debug, Default)]
pub struct BusySpinWaitStrategy;

impl BusySpinWaitStrategy {
    /// Create a new busy-spin wait strategy
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWaitStrategy {
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64> {
        let mut available_sequence;

        while {
            available_sequence = cursor.get();
            available_sequence < sequence
        } {
            barrier.check_alert()?;
            std::hint::spin_loop();
        }

        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}
}

/// Sleeping wait strategy
///
/// Sleeps between checks. Lowest CPU usage, latency bounded by the sleep.
#[derive(Debug)]
pub struct SleepingWaitStrategy {
    sleep_duration: Duration,
}

impl SleepingWaitStrategy {
    /// Create a new sleeping wait strategy with a 100µs sleep
    pub fn new() -> Self {
        Self::new_with_duration(Duration::from_micros(100))
    }

    /// Create a new sleeping wait strategy with a custom sleep duration
    pub fn new_with_duration(sleep_duration: Duration) -> Self {
        Self { sleep_duration }
    }
}

impl Default for SleepingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for SleepingWaitStrategy {
    fn wait_for(&self, sequence: i64, cursor: &Sequence, barrier: &SequenceBarrier) -> Result<i64> {
        let mut available_sequence;

        while {
            available_sequence = cursor.get();
            available_sequence < sequence
        } {
            barrier.check_alert()?;
            thread::sleep(self.sleep_duration);
        }

        Ok(available_sequence)
    }

    fn signal_all_when_blocking(&self) {}
}
