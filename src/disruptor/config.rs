//! Configuration Management
//!
//! Serializable settings for a disruptor: ring size, wait strategy and the
//! consumer thread. Loaded from JSON and validated before anything is built.

use crate::disruptor::{
    is_power_of_two, BlockingWaitStrategy, BusySpinWaitStrategy, DisruptorError, Result,
    SleepingWaitStrategy, TimeoutBlockingWaitStrategy, WaitStrategy, YieldingWaitStrategy,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Supported wait strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitStrategyKind {
    /// Mutex and condition variable
    #[default]
    Blocking,
    /// Spin without yielding
    BusySpin,
    /// Spin, then yield
    Yielding,
    /// Sleep between checks
    Sleeping,
    /// Blocking with a timeout
    TimeoutBlocking,
}

impl WaitStrategyKind {
    /// All supported names, as accepted by `from_str`
    pub const NAMES: [&'static str; 5] = [
        "blocking",
        "busy-spin",
        "yielding",
        "sleeping",
        "timeout-blocking",
    ];

    /// The canonical name of this strategy
    pub fn name(&self) -> &'static str {
        match self {
            WaitStrategyKind::Blocking => "blocking",
            WaitStrategyKind::BusySpin => "busy-spin",
            WaitStrategyKind::Yielding => "yielding",
            WaitStrategyKind::Sleeping => "sleeping",
            WaitStrategyKind::TimeoutBlocking => "timeout-blocking",
        }
    }
}

impl fmt::Display for WaitStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaitStrategyKind {
    type Err = DisruptorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blocking" => Ok(WaitStrategyKind::Blocking),
            "busy-spin" | "busyspin" => Ok(WaitStrategyKind::BusySpin),
            "yielding" => Ok(WaitStrategyKind::Yielding),
            "sleeping" => Ok(WaitStrategyKind::Sleeping),
            "timeout-blocking" | "timeout" => Ok(WaitStrategyKind::TimeoutBlocking),
            _ => Err(DisruptorError::Config(format!(
                "Invalid wait strategy: {s}. Supported strategies: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// Disruptor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisruptorConfig {
    /// Number of slots; must be a power of 2
    pub buffer_size: usize,
    /// Consumer wait strategy
    pub wait_strategy: WaitStrategyKind,
    /// Timeout for `timeout-blocking`, in milliseconds
    pub timeout_ms: u64,
    /// Sleep for `sleeping`, in microseconds
    pub sleep_micros: u64,
    /// Producer backoff while the ring is full, in nanoseconds
    pub producer_park_nanos: u64,
    /// Consumer thread name
    pub thread_name: String,
    /// CPU core to pin the consumer thread to
    pub core_id: Option<usize>,
}

impl Default for DisruptorConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            wait_strategy: WaitStrategyKind::Blocking,
            timeout_ms: 100,
            sleep_micros: 100,
            producer_park_nanos: 1,
            thread_name: "batch-processor".to_string(),
            core_id: None,
        }
    }
}

impl DisruptorConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DisruptorError::Config(format!("Invalid configuration JSON: {e}")))
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DisruptorError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DisruptorError::Config(format!("Cannot serialize configuration: {e}")))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !is_power_of_two(self.buffer_size) {
            return Err(DisruptorError::Config(format!(
                "Buffer size must be a power of 2, got: {}",
                self.buffer_size
            )));
        }

        if self.wait_strategy == WaitStrategyKind::TimeoutBlocking && self.timeout_ms == 0 {
            return Err(DisruptorError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.thread_name.is_empty() {
            return Err(DisruptorError::Config(
                "Thread name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Producer backoff while the ring is full
    pub fn producer_park_duration(&self) -> Duration {
        Duration::from_nanos(self.producer_park_nanos)
    }

    /// Instantiate the configured wait strategy
    pub fn build_wait_strategy(&self) -> Arc<dyn WaitStrategy> {
        match self.wait_strategy {
            WaitStrategyKind::Blocking => Arc::new(BlockingWaitStrategy::new()),
            WaitStrategyKind::BusySpin => Arc::new(BusySpinWaitStrategy::new()),
            WaitStrategyKind::Yielding => Arc::new(YieldingWaitStrategy::new()),
            WaitStrategyKind::Sleeping => Arc::new(SleepingWaitStrategy::new_with_duration(
                Duration::from_micros(self.sleep_micros),
            )),
            WaitStrategyKind::TimeoutBlocking => Arc::new(TimeoutBlockingWaitStrategy::new(
                Duration::from_millis(self.timeout_ms),
            )),
        }
    }
}
