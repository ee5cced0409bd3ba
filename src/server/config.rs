// ABOUTME: Server configuration
// ABOUTME: Defines the construction-time parameters of a TCP exporter

use crate::server::encoder::WireFormat;
use std::net::SocketAddr;

/// Default port, the conventional instrument-socket port
pub const DEFAULT_PORT: u16 = 5025;

/// Per-connection outbound queue depth, in frames
const DEFAULT_FRAME_QUEUE: usize = 64;

/// TCP exporter configuration
///
/// Everything here is fixed once the exporter is started; there is no
/// runtime reconfiguration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_addr: SocketAddr,
    /// Wire format broadcast to every client
    pub format: WireFormat,
    /// Frames a slow client may have queued before new ones are dropped
    pub frame_queue: usize,
}

impl ServerConfig {
    /// Create a configuration for the given port on all interfaces
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the wire format
    pub fn format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the per-connection outbound queue depth
    pub fn frame_queue(mut self, frames: usize) -> Self {
        self.frame_queue = frames;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            format: WireFormat::Text,
            frame_queue: DEFAULT_FRAME_QUEUE,
        }
    }
}
