//! Thread management and CPU affinity
//!
//! Spawns the consumer thread with a name and an optional CPU core pin.

use crate::disruptor::{DisruptorError, Result};
use core_affinity::CoreId;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Joinable handle for a thread spawned by [`ThreadBuilder`]
///
/// Dropping an unjoined `ManagedThread` joins it and discards the result.
#[derive(Debug)]
pub struct ManagedThread<R> {
    join_handle: Option<JoinHandle<R>>,
    thread_name: String,
}

impl<R> ManagedThread<R> {
    /// Get the thread name
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Wait for the thread to finish and return its result
    ///
    /// # Errors
    /// `DisruptorError::Thread` if the thread panicked
    pub fn join(mut self) -> Result<R> {
        let handle = self
            .join_handle
            .take()
            .ok_or_else(|| DisruptorError::Thread(format!("{} already joined", self.thread_name)))?;

        handle
            .join()
            .map_err(|_| DisruptorError::Thread(format!("{} panicked", self.thread_name)))
    }

    /// Check if the thread is still running
    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<R> Drop for ManagedThread<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Thread builder with CPU affinity and naming support
#[derive(Debug, Default)]
pub struct ThreadBuilder {
    name: Option<String>,
    affinity: Option<CoreId>,
}

impl ThreadBuilder {
    /// Create a new thread builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the thread to a CPU core
    ///
    /// # Errors
    /// `DisruptorError::Config` if the core is not available on this machine
    pub fn pin_at_core(mut self, core_id: usize) -> Result<Self> {
        validate_core_id(core_id)?;
        self.affinity = Some(CoreId { id: core_id });
        Ok(self)
    }

    /// Set the thread name
    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Spawn a thread with the configured settings
    ///
    /// # Errors
    /// `DisruptorError::Thread` if the OS refuses to create the thread
    pub fn spawn<F, R>(self, f: F) -> Result<ManagedThread<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let thread_name = self.name.unwrap_or_else(|| "processor".to_string());
        let affinity = self.affinity;

        let name_for_closure = thread_name.clone();
        let join_handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                set_affinity_if_defined(affinity, &name_for_closure);
                f()
            })
            .map_err(|e| DisruptorError::Thread(format!("failed to spawn {thread_name}: {e}")))?;

        debug!(thread = %thread_name, "spawned managed thread");
        Ok(ManagedThread {
            join_handle: Some(join_handle),
            thread_name,
        })
    }
}

fn validate_core_id(core_id: usize) -> Result<()> {
    let available_cores = get_available_cores();

    if available_cores.contains(&core_id) {
        Ok(())
    } else {
        Err(DisruptorError::Config(format!(
            "CPU core {core_id} is not available. Available cores: {available_cores:?}"
        )))
    }
}

fn set_affinity_if_defined(affinity: Option<CoreId>, thread_name: &str) {
    if let Some(core_id) = affinity {
        if core_affinity::set_for_current(core_id) {
            debug!(thread = thread_name, core = core_id.id, "pinned thread to core");
        } else {
            warn!(thread = thread_name, core = core_id.id, "could not pin thread to core");
        }
    }
}

/// Get the CPU core IDs available on this machine
pub fn get_available_cores() -> Vec<usize> {
    core_affinity::get_core_ids()
        .unwrap_or_default()
        .iter()
        .map(|core| core.id)
        .collect()
}
