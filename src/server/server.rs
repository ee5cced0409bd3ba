// ABOUTME: TCP exporter core
// ABOUTME: Owns the listener, accept loop, and the encode-once broadcast path

use crate::capture::SampleBatch;
use crate::exporter::{Exporter, ExporterKind, ExportSettings};
use crate::server::client_handler::handle_client;
use crate::server::client_manager::{ClientManager, Frame};
use crate::server::clock::unix_millis;
use crate::server::config::ServerConfig;
use crate::server::encoder::{create_encoder, FrameEncoder, WireFormat};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Streams every submitted batch to all connected TCP clients
///
/// The wire format is fixed for the instance's lifetime. Each batch is
/// encoded exactly once and the resulting buffer is offered unchanged to
/// every live connection; clients that cannot keep up miss frames rather
/// than slowing the stream down.
pub struct TcpExporter {
    config: Arc<ServerConfig>,
    client_manager: Arc<ClientManager>,
    encoder: Mutex<Box<dyn FrameEncoder>>,
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl TcpExporter {
    /// Bind the listener and start accepting connections
    ///
    /// A bind failure is fatal to the instance: the error is returned and no
    /// exporter exists, so `submit` can never be called on a dead server.
    pub async fn start(config: ServerConfig, settings: Arc<ExportSettings>) -> crate::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let config = Arc::new(config);
        let client_manager = Arc::new(ClientManager::new());
        let encoder = Mutex::new(create_encoder(config.format, settings));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&client_manager),
            Arc::clone(&config),
        ));

        log::info!(
            "TCP exporter listening on {} ({} frames)",
            local_addr,
            config.format
        );

        Ok(Self {
            config,
            client_manager,
            encoder,
            local_addr,
            accept_task,
        })
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of currently connected clients
    pub fn client_count(&self) -> usize {
        self.client_manager.client_count()
    }

    /// The wire format this instance speaks
    pub fn format(&self) -> WireFormat {
        self.config.format
    }

    /// Encode one batch and broadcast it to every connection
    ///
    /// Invoked once per acquisition cycle. Always returns true: per-client
    /// write problems are dropped frames, not submit failures.
    pub fn submit(&self, batch: &SampleBatch) -> bool {
        let timestamp_ms = unix_millis();

        let frame: Frame = {
            let mut encoder = self.encoder.lock();
            if self.client_manager.take_joined() {
                encoder.request_header();
            }
            encoder.encode(batch, timestamp_ms).into()
        };

        let delivered = self.client_manager.broadcast(frame);
        log::trace!(
            "Broadcast {} frame to {} of {} clients",
            self.config.format,
            delivered,
            self.client_count()
        );

        true
    }
}

impl Drop for TcpExporter {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

impl Exporter for TcpExporter {
    fn name(&self) -> &str {
        "Export TCP"
    }

    fn kind(&self) -> ExporterKind {
        ExporterKind::Continuous
    }

    fn submit(&self, batch: &SampleBatch) -> bool {
        TcpExporter::submit(self, batch)
    }
}

/// Accept connections forever, spawning one handler task per client
async fn accept_loop(
    listener: TcpListener,
    client_manager: Arc<ClientManager>,
    config: Arc<ServerConfig>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                log::debug!("New connection from {}", peer_addr);
                tokio::spawn(handle_client(
                    stream,
                    Arc::clone(&client_manager),
                    Arc::clone(&config),
                ));
            }
            Err(e) => {
                // Transient accept errors (fd exhaustion, peer resets) must
                // not kill the listener.
                log::warn!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ChannelSamples;

    fn loopback_config() -> ServerConfig {
        ServerConfig::default().bind_addr("127.0.0.1:0".parse().unwrap())
    }

    #[tokio::test]
    async fn test_start_assigns_ephemeral_port() {
        let exporter = TcpExporter::start(loopback_config(), Arc::new(ExportSettings::default()))
            .await
            .unwrap();

        assert_ne!(exporter.local_addr().port(), 0);
        assert_eq!(exporter.client_count(), 0);
        assert_eq!(exporter.format(), WireFormat::Text);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_an_error() {
        let first = TcpExporter::start(loopback_config(), Arc::new(ExportSettings::default()))
            .await
            .unwrap();

        let taken = ServerConfig::default().bind_addr(first.local_addr());
        let second = TcpExporter::start(taken, Arc::new(ExportSettings::default())).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_submit_without_clients_succeeds() {
        let exporter = TcpExporter::start(loopback_config(), Arc::new(ExportSettings::default()))
            .await
            .unwrap();

        let batch = SampleBatch::new(vec![ChannelSamples::new(0.001, vec![1.0, 2.0])]);
        assert!(exporter.submit(&batch));
        assert!(exporter.submit(&SampleBatch::default()));
    }
}
