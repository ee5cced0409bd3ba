// ABOUTME: Exporter capability interface and registry
// ABOUTME: Routes sample batches to registered exporters with shared settings

use crate::capture::{ChannelId, SampleBatch};
use std::sync::Arc;

/// How an exporter consumes the sample stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterKind {
    /// Produces a single artifact from one capture (image, file dump)
    Snapshot,
    /// Consumes every batch for as long as the exporter lives
    Continuous,
}

/// Capability interface implemented by every exporter variant
///
/// Concrete exporters are selected at registration time; there is no runtime
/// reconfiguration. GUI-facing accessors are stubs for embedders that surface
/// exporters in a menu.
pub trait Exporter: Send + Sync {
    /// Human-readable exporter name for the plugin menu
    fn name(&self) -> &str;

    /// How this exporter consumes the stream
    fn kind(&self) -> ExporterKind;

    /// Whether the exporter has a visible GUI surface
    fn visible(&self) -> bool {
        false
    }

    /// Ingest one batch; returns whether the export was attempted
    fn submit(&self, batch: &SampleBatch) -> bool;

    /// Finalize any pending output
    fn save(&self) -> bool {
        true
    }

    /// Export progress in the range 0.0 to 1.0
    fn progress(&self) -> f32 {
        0.5
    }
}

impl<T: Exporter + ?Sized> Exporter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> ExporterKind {
        (**self).kind()
    }

    fn visible(&self) -> bool {
        (**self).visible()
    }

    fn submit(&self, batch: &SampleBatch) -> bool {
        (**self).submit(batch)
    }

    fn save(&self) -> bool {
        (**self).save()
    }

    fn progress(&self) -> f32 {
        (**self).progress()
    }
}

/// Read-only export configuration shared by all exporters
///
/// Supplies the per-channel display names the text protocol embeds in its
/// header. Passed explicitly at construction rather than read from ambient
/// state.
#[derive(Debug, Clone, Default)]
pub struct ExportSettings {
    channel_names: Vec<String>,
}

impl ExportSettings {
    /// Create settings with explicit channel display names
    pub fn new(channel_names: Vec<String>) -> Self {
        Self { channel_names }
    }

    /// Display name for a channel, falling back to `CH<n+1>` numbering
    pub fn channel_name(&self, channel: ChannelId) -> String {
        self.channel_names
            .get(channel)
            .cloned()
            .unwrap_or_else(|| format!("CH{}", channel + 1))
    }
}

/// Registry of active exporters
///
/// The acquisition side hands each finished batch to `dispatch`, which fans
/// it out to every registered exporter in registration order.
pub struct ExporterRegistry {
    settings: Arc<ExportSettings>,
    exporters: Vec<Box<dyn Exporter>>,
}

impl ExporterRegistry {
    /// Create an empty registry around shared export settings
    pub fn new(settings: Arc<ExportSettings>) -> Self {
        Self {
            settings,
            exporters: Vec::new(),
        }
    }

    /// Shared export settings
    pub fn settings(&self) -> Arc<ExportSettings> {
        Arc::clone(&self.settings)
    }

    /// Register an exporter; it starts receiving batches immediately
    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        log::info!("Registered exporter: {}", exporter.name());
        self.exporters.push(exporter);
    }

    /// Number of registered exporters
    pub fn exporter_count(&self) -> usize {
        self.exporters.len()
    }

    /// Hand one batch to every registered exporter
    pub fn dispatch(&self, batch: &SampleBatch) {
        for exporter in &self.exporters {
            if !exporter.submit(batch) {
                log::warn!("Exporter {} rejected batch", exporter.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ChannelSamples;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingExporter {
        batches: Arc<AtomicUsize>,
    }

    impl Exporter for RecordingExporter {
        fn name(&self) -> &str {
            "Recording"
        }

        fn kind(&self) -> ExporterKind {
            ExporterKind::Continuous
        }

        fn submit(&self, _batch: &SampleBatch) -> bool {
            self.batches.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn test_channel_name_fallback() {
        let settings = ExportSettings::new(vec!["Probe A".to_string()]);
        assert_eq!(settings.channel_name(0), "Probe A");
        assert_eq!(settings.channel_name(1), "CH2");
    }

    #[test]
    fn test_dispatch_reaches_every_exporter() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut registry = ExporterRegistry::new(Arc::new(ExportSettings::default()));
        registry.register(Box::new(RecordingExporter {
            batches: Arc::clone(&first),
        }));
        registry.register(Box::new(RecordingExporter {
            batches: Arc::clone(&second),
        }));
        assert_eq!(registry.exporter_count(), 2);

        let batch = SampleBatch::new(vec![ChannelSamples::new(0.001, vec![1.0])]);
        registry.dispatch(&batch);
        registry.dispatch(&batch);

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }
}
