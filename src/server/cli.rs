// ABOUTME: Shared CLI argument parsing and server builder utilities
// ABOUTME: Turns command-line flags into config, settings, and a demo source

use crate::exporter::ExportSettings;
use crate::server::{SampleSource, ServerConfig, TestSignalSource, WireFormat};
use clap::Args;
use std::net::SocketAddr;

/// Common server arguments for the broadcaster binary
///
/// Use with `#[command(flatten)]` in your binary's Args struct:
/// ```ignore
/// #[derive(Parser)]
/// struct MyArgs {
///     #[command(flatten)]
///     server: ServerArgs,
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to bind the TCP listener to
    #[arg(short, long, default_value = "0.0.0.0:5025")]
    pub bind: SocketAddr,

    /// Emit compact binary frames instead of CSV text
    #[arg(long)]
    pub binary: bool,

    /// Number of simulated channels
    #[arg(short, long, default_value = "2")]
    pub channels: usize,

    /// Test signal frequency in Hz
    #[arg(short, long, default_value = "1000.0")]
    pub frequency: f64,

    /// Simulated sample rate in Hz
    #[arg(long, default_value = "48000.0")]
    pub sample_rate: f64,

    /// Samples per channel per batch
    #[arg(long, default_value = "512")]
    pub batch_samples: usize,

    /// Batch interval in milliseconds
    #[arg(long, default_value = "100")]
    pub batch_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerArgs {
    /// Initialize tracing based on verbosity flag
    pub fn init_tracing(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = if self.verbose {
            "scopecast=debug"
        } else {
            "scopecast=info"
        };

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter.into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Log startup information
    pub fn log_startup_info(&self) {
        tracing::info!("Scopecast Server v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("Bind: {}", self.bind);
        tracing::info!("Format: {}", self.wire_format());
    }

    /// The wire format selected by the flags
    pub fn wire_format(&self) -> WireFormat {
        if self.binary {
            WireFormat::Binary
        } else {
            WireFormat::Text
        }
    }

    /// Build the exporter configuration from these args
    pub fn build_config(&self) -> ServerConfig {
        ServerConfig::default()
            .bind_addr(self.bind)
            .format(self.wire_format())
    }

    /// Build the export settings (default channel numbering)
    pub fn build_settings(&self) -> ExportSettings {
        ExportSettings::default()
    }

    /// Create the demo signal source described by the flags
    pub fn create_source(&self) -> Box<dyn SampleSource> {
        tracing::info!(
            "Signal: {} Hz sine on {} channels, {} samples per batch at {} Hz",
            self.frequency,
            self.channels,
            self.batch_samples,
            self.sample_rate
        );
        Box::new(TestSignalSource::new(
            self.frequency,
            self.sample_rate,
            self.channels,
            self.batch_samples,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> ServerArgs {
        ServerArgs {
            bind: "0.0.0.0:5025".parse().unwrap(),
            binary: false,
            channels: 2,
            frequency: 1000.0,
            sample_rate: 48_000.0,
            batch_samples: 512,
            batch_ms: 100,
            verbose: false,
        }
    }

    #[test]
    fn test_default_args() {
        let args = default_args();
        assert_eq!(args.bind.port(), 5025);
        assert_eq!(args.wire_format(), WireFormat::Text);
        assert_eq!(args.batch_ms, 100);
    }

    #[test]
    fn test_build_config() {
        let mut args = default_args();
        args.bind = "127.0.0.1:9000".parse().unwrap();
        args.binary = true;

        let config = args.build_config();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.format, WireFormat::Binary);
    }

    #[test]
    fn test_create_source_shape() {
        let mut source = default_args().create_source();
        let batch = source.next_batch();
        assert_eq!(batch.channel_count(), 2);
        assert_eq!(batch.channel(0).unwrap().len(), 512);
    }
}
