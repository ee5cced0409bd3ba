// ABOUTME: Per-connection TCP handler
// ABOUTME: Forwards queued frames to the peer and watches for disconnect

use crate::server::client_manager::{ClientManager, ConnectedClient, Frame};
use crate::server::config::ServerConfig;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle one accepted TCP connection until the peer goes away
///
/// The protocol is write-only: the read half is drained solely to notice the
/// peer closing. Registry removal happens here, on the connection's own task
/// after its I/O loop ends, never from inside a broadcast.
pub async fn handle_client(stream: TcpStream, client_manager: Arc<ClientManager>, config: Arc<ServerConfig>) {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => addr,
        Err(e) => {
            log::warn!("Connection lost before registration: {}", e);
            return;
        }
    };

    // Frames are small and latency matters more than throughput here.
    if let Err(e) = stream.set_nodelay(true) {
        log::debug!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
    }

    let (mut reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::channel::<Frame>(config.frame_queue.max(1));

    let id = Uuid::new_v4();
    client_manager.add_client(ConnectedClient::new(id, peer_addr, tx));

    // Forward queued frames to the socket until it breaks.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if writer.write_all(&frame).await.is_err() {
                log::debug!("Write to {} failed, stopping forwarder", peer_addr);
                break;
            }
        }
    });

    // Clients never speak; a read of zero bytes or an error means the peer
    // closed the connection.
    let mut scratch = [0u8; 256];
    loop {
        match reader.read(&mut scratch).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }

    client_manager.remove_client(&id);
    send_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::ServerConfig;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_handler_registers_and_unregisters() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let manager = Arc::new(ClientManager::new());
        let config = Arc::new(ServerConfig::default());

        let client = TcpStream::connect(addr).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();

        let handler = tokio::spawn(handle_client(accepted, Arc::clone(&manager), config));

        // Wait for registration, then drop the client to trigger removal.
        while manager.client_count() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        drop(client);

        handler.await.unwrap();
        assert_eq!(manager.client_count(), 0);
    }
}
