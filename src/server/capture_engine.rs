// ABOUTME: Capture engine driving the batch cadence
// ABOUTME: Pulls batches from a sample source and dispatches them to exporters

use crate::exporter::ExporterRegistry;
use crate::server::signal_source::SampleSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

/// Tick-driven loop standing in for the acquisition pipeline
///
/// At every batch interval it takes one batch from the source and hands it
/// to the exporter registry. Missed ticks are skipped, not replayed; the
/// stream is real-time and stale batches have no value.
pub struct CaptureEngine {
    source: Box<dyn SampleSource>,
    registry: Arc<ExporterRegistry>,
    batch_interval: Duration,
}

impl CaptureEngine {
    /// Create an engine over a source and the exporters it feeds
    pub fn new(
        source: Box<dyn SampleSource>,
        registry: Arc<ExporterRegistry>,
        batch_interval_ms: u64,
    ) -> Self {
        Self {
            source,
            registry,
            batch_interval: Duration::from_millis(batch_interval_ms),
        }
    }

    /// Run the capture loop until shutdown is signalled
    ///
    /// This should be spawned as a separate task.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.batch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!(
            "Capture engine started: {}ms batches, {} channels at {} Hz",
            self.batch_interval.as_millis(),
            self.source.channel_count(),
            self.source.sample_rate()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let batch = self.source.next_batch();
                    self.registry.dispatch(&batch);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        log::info!("Capture engine shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Spawn a capture engine task
pub fn spawn_capture_engine(
    source: Box<dyn SampleSource>,
    registry: Arc<ExporterRegistry>,
    batch_interval_ms: u64,
) -> (tokio::task::JoinHandle<()>, watch::Sender<bool>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut engine = CaptureEngine::new(source, registry, batch_interval_ms);
        engine.run(shutdown_rx).await;
    });

    (handle, shutdown_tx)
}
