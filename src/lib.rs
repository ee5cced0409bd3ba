// ABOUTME: Main library entry point for scopecast
// ABOUTME: Exports the sample-batch model, exporter interface, and TCP server

//! # scopecast
//!
//! Real-time TCP broadcaster for captured oscilloscope waveform sample
//! streams.
//!
//! Every submitted batch of samples is encoded once, either as a
//! self-describing CSV-like text stream or as a compact big-endian binary
//! frame, and the identical bytes are pushed to every connected TCP client.
//! Delivery is best-effort and at-most-once: a client whose outbound queue is
//! full simply misses that frame.
//!
//! ## Example: broadcasting batches
//!
//! ```no_run
//! use scopecast::capture::{ChannelSamples, SampleBatch};
//! use scopecast::exporter::ExportSettings;
//! use scopecast::server::{ServerConfig, TcpExporter, WireFormat};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> scopecast::Result<()> {
//!     let config = ServerConfig::default()
//!         .bind_addr("0.0.0.0:5025".parse().unwrap())
//!         .format(WireFormat::Text);
//!
//!     let exporter = TcpExporter::start(config, Arc::new(ExportSettings::default())).await?;
//!
//!     let batch = SampleBatch::new(vec![ChannelSamples::new(
//!         1.0 / 48_000.0,
//!         vec![0.0, 0.5, 1.0],
//!     )]);
//!     exporter.submit(&batch);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Sample batch and channel data model
pub mod capture;
/// Exporter capability interface, registry, and export settings
pub mod exporter;
/// TCP broadcast server implementation
pub mod server;

pub use capture::{ChannelSamples, SampleBatch};
pub use exporter::{Exporter, ExporterRegistry, ExportSettings};
pub use server::{ServerConfig, TcpExporter, WireFormat};

/// Result type for scopecast operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for scopecast
pub mod error {
    use thiserror::Error;

    /// Error types for scopecast operations
    #[derive(Error, Debug)]
    pub enum Error {
        /// The TCP listener could not be bound to the requested address
        #[error("unable to start TCP server: {0}")]
        Bind(#[from] std::io::Error),
    }
}
