//! Event Handler Implementation
//!
//! Handlers hold the business logic run for every consumed event. They get a
//! shared reference to the slot: the producer owns slot contents, the consumer
//! only reads them.

use crate::disruptor::Result;

/// Handler for processing events from the ring buffer
///
/// # Type Parameters
/// * `T` - The event type that will be processed
///
/// # Examples
/// ```
/// use ringbatch::disruptor::{EventHandler, Result};
///
/// struct OrderEvent {
///     price: i64,
/// }
///
/// struct TotalHandler {
///     total: i64,
/// }
///
/// impl EventHandler<OrderEvent> for TotalHandler {
///     fn on_event(&mut self, event: &OrderEvent, _sequence: i64, end_of_batch: bool) -> Result<()> {
///         self.total += event.price;
///         if end_of_batch {
///             // flush side effects once per batch
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait EventHandler<T>: Send {
    /// Process an event
    ///
    /// # Arguments
    /// * `event` - The published event
    /// * `sequence` - The sequence number of the event
    /// * `end_of_batch` - True for the last event of the currently available
    ///   batch; defer expensive flushes to this call
    fn on_event(&mut self, event: &T, sequence: i64, end_of_batch: bool) -> Result<()>;

    /// Called once on the consumer thread before the first event
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once on the consumer thread after the processor halts
    fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when a time-bounded wait strategy gives up waiting
    ///
    /// `sequence` is the last sequence this consumer processed.
    fn on_timeout(&mut self, _sequence: i64) -> Result<()> {
        Ok(())
    }
}

/// Event handler built from a closure
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> ClosureEventHandler<F> {
    /// Create a new closure-based event handler
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<T, F> EventHandler<T> for ClosureEventHandler<F>
where
    F: FnMut(&T, i64, bool) -> Result<()> + Send,
{
    fn on_event(&mut self, event: &T, sequence: i64, end_of_batch: bool) -> Result<()> {
        (self.handler)(event, sequence, end_of_batch)
    }
}

/// A handler that does nothing, for measuring framework overhead
#[derive(Debug, Default)]
pub struct NoOpEventHandler;

impl NoOpEventHandler {
    /// Create a new no-op event handler
    pub fn new() -> Self {
        Self
    }
}

impl<T> EventHandler<T> for NoOpEventHandler {
    fn on_event(&mut self, _event: &T, _sequence: i64, _end_of_batch: bool) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestEvent {
        value: i64,
    }

    #[test]
    fn test_closure_event_handler() {
        let mut seen = Vec::new();
        {
            let mut handler = ClosureEventHandler::new(|event: &TestEvent, sequence: i64, end_of_batch: bool| -> Result<()> {
                seen.push((event.value, sequence, end_of_batch));
                Ok(())
            });

            handler.on_event(&TestEvent { value: 7 }, 0, false).unwrap();
            handler.on_event(&TestEvent { value: 8 }, 1, true).unwrap();
        }

        assert_eq!(seen, vec![(7, 0, false), (8, 1, true)]);
    }

    #[test]
    fn test_default_lifecycle_callbacks() {
        let mut handler = NoOpEventHandler::new();
        assert!(EventHandler::<TestEvent>::on_start(&mut handler).is_ok());
        assert!(EventHandler::<TestEvent>::on_timeout(&mut handler, 3).is_ok());
        assert!(EventHandler::<TestEvent>::on_shutdown(&mut handler).is_ok());
        assert!(handler.on_event(&TestEvent::default(), 0, true).is_ok());
    }
}
