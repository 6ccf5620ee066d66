//! Exception Handler Implementation
//!
//! Decides what happens when an event handler returns an error. The batch
//! processor reports the failure here and moves on to the next event.

use crate::disruptor::DisruptorError;
use tracing::error;

/// Handler for errors raised by an event handler
///
/// # Type Parameters
/// * `T` - The event type being processed
pub trait ExceptionHandler<T>: Send {
    /// Handle an error returned by `on_event`
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, event: &T);

    /// Handle an error returned by `on_start`
    fn handle_on_start_exception(&self, error: DisruptorError);

    /// Handle an error returned by `on_shutdown`
    fn handle_on_shutdown_exception(&self, error: DisruptorError);
}

/// Exception handler that logs every error and continues
#[derive(Debug, Default)]
pub struct DefaultExceptionHandler;

impl DefaultExceptionHandler {
    /// Create a new logging exception handler
    pub fn new() -> Self {
        Self
    }
}

impl<T> ExceptionHandler<T> for DefaultExceptionHandler {
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, _event: &T) {
        error!(sequence, %error, "event handler failed");
    }

    fn handle_on_start_exception(&self, error: DisruptorError) {
        error!(%error, "event handler failed on start");
    }

    fn handle_on_shutdown_exception(&self, error: DisruptorError) {
        error!(%error, "event handler failed on shutdown");
    }
}

/// Exception handler that drops every error
#[derive(Debug, Default)]
pub struct IgnoreExceptionHandler;

impl IgnoreExceptionHandler {
    /// Create a new ignoring exception handler
    pub fn new() -> Self {
        Self
    }
}

impl<T> ExceptionHandler<T> for IgnoreExceptionHandler {
    fn handle_event_exception(&self, _error: DisruptorError, _sequence: i64, _event: &T) {}

    fn handle_on_start_exception(&self, _error: DisruptorError) {}

    fn handle_on_shutdown_exception(&self, _error: DisruptorError) {}
}
