//! Event Factory Implementation
//!
//! Factories pre-populate every slot of the ring buffer once, at construction.
//! After that the slots are reused, never reallocated.

/// Factory for creating blank events
///
/// # Examples
/// ```
/// use ringbatch::disruptor::EventFactory;
///
/// struct OrderEvent {
///     price: i64,
/// }
///
/// struct OrderEventFactory;
///
/// impl EventFactory<OrderEvent> for OrderEventFactory {
///     fn new_instance(&self) -> OrderEvent {
///         OrderEvent { price: 0 }
///     }
/// }
/// ```
pub trait EventFactory<T> {
    /// Create a new event instance in its initial state
    fn new_instance(&self) -> T;
}

/// Event factory that uses the Default trait
pub struct DefaultEventFactory<T: Default> {
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T: Default> DefaultEventFactory<T> {
    /// Create a new default event factory
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Default> Default for DefaultEventFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> EventFactory<T> for DefaultEventFactory<T> {
    fn new_instance(&self) -> T {
        T::default()
    }
}

/// Event factory backed by a closure
pub struct ClosureEventFactory<F> {
    factory_fn: F,
}

impl<F> ClosureEventFactory<F> {
    /// Create a new closure-based event factory
    pub fn new(factory_fn: F) -> Self {
        Self { factory_fn }
    }
}

impl<T, F> EventFactory<T> for ClosureEventFactory<F>
where
    F: Fn() -> T,
{
    fn new_instance(&self) -> T {
        (self.factory_fn)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct TestEvent {
        value: i64,
        name: String,
    }

    #[test]
    fn test_default_event_factory() {
        let factory = DefaultEventFactory::<TestEvent>::new();
        assert_eq!(factory.new_instance(), TestEvent::default());
    }

    #[test]
    fn test_closure_event_factory_instances_are_independent() {
        let factory = ClosureEventFactory::new(|| TestEvent {
            value: 42,
            name: "blank".to_string(),
        });

        let mut first = factory.new_instance();
        let second = factory.new_instance();
        first.value = 1;

        assert_eq!(first.value, 1);
        assert_eq!(second.value, 42);
        assert_eq!(second.name, "blank");
    }
}
