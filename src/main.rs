//! RingBatch demo driver
//!
//! Publishes a stream of order events through a single producer, single
//! consumer disruptor and prints every event the consumer receives. The
//! producer pauses partway through so the consumer drains the ring and blocks,
//! then resumes.

use clap::Parser;
use ringbatch::disruptor::{
    DefaultEventFactory, DisruptorBuilder, DisruptorConfig, EventHandler, Result as DisruptorResult,
    WaitStrategyKind,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ringbatch")]
#[command(about = "Single producer, single consumer Disruptor demo")]
#[command(version)]
pub struct Args {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ring buffer size (must be power of 2)
    #[arg(short, long)]
    pub buffer_size: Option<usize>,

    /// Wait strategy: blocking, busy-spin, yielding, sleeping, timeout-blocking
    #[arg(short, long)]
    pub wait_strategy: Option<WaitStrategyKind>,

    /// Number of events to publish
    #[arg(short, long, default_value = "100")]
    pub events: i64,

    /// Pause the producer after publishing this event
    #[arg(long, default_value = "70")]
    pub pause_at: i64,

    /// Length of the producer pause, in milliseconds
    #[arg(long, default_value = "2000")]
    pub pause_ms: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// An order flowing through the ring
#[derive(Debug, Default)]
struct OrderEvent {
    message: String,
    price: i64,
}

/// Prints each order and tracks what it has seen
#[derive(Debug, Default)]
struct PrintingHandler {
    received: i64,
    last_sequence: i64,
}

impl EventHandler<OrderEvent> for PrintingHandler {
    fn on_event(&mut self, event: &OrderEvent, sequence: i64, end_of_batch: bool) -> DisruptorResult<()> {
        println!(
            "Event: {} price: {} sequence: {} end of batch: {}",
            event.message, event.price, sequence, end_of_batch
        );
        self.received += 1;
        self.last_sequence = sequence;
        Ok(())
    }

    fn on_start(&mut self) -> DisruptorResult<()> {
        debug!("order handler started");
        Ok(())
    }

    fn on_shutdown(&mut self) -> DisruptorResult<()> {
        debug!(received = self.received, "order handler stopped");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = load_config(&args)?;
    info!("Configuration: {config:?}");

    let (mut producer, consumer) =
        DisruptorBuilder::from_config(&config, DefaultEventFactory::<OrderEvent>::new())?
            .start(PrintingHandler::default())?;

    let mut last = -1;
    for i in 0..args.events {
        last = producer.publish_event(|event, _sequence| {
            event.message = format!("message{i}");
            event.price = i * 10;
        })?;

        if i == args.pause_at {
            info!(sequence = last, "producer pausing for {}ms", args.pause_ms);
            thread::sleep(Duration::from_millis(args.pause_ms));
        }
    }

    consumer.wait_until_processed(last)?;
    let handler = consumer.shutdown()?;

    info!(
        received = handler.received,
        last_sequence = handler.last_sequence,
        "all events consumed"
    );
    Ok(())
}

/// Build the effective configuration: defaults, then file, then flags
fn load_config(args: &Args) -> anyhow::Result<DisruptorConfig> {
    let mut config = match &args.config {
        Some(path) => DisruptorConfig::from_file(path)?,
        None => DisruptorConfig {
            buffer_size: 16,
            ..DisruptorConfig::default()
        },
    };

    if let Some(buffer_size) = args.buffer_size {
        config.buffer_size = buffer_size;
    }
    if let Some(wait_strategy) = args.wait_strategy {
        config.wait_strategy = wait_strategy;
    }

    Ok(config)
}

/// Initialize logging based on the specified level
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
