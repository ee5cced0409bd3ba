// ABOUTME: Client connection registry
// ABOUTME: Tracks live TCP connections and fans encoded frames out to them

use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// One encoded frame, shared unchanged between every connection
pub type Frame = Arc<[u8]>;

/// A connected client
///
/// Frames reach the peer through a bounded queue drained by the connection's
/// writer task. The queue depth stands in for socket writability: when it is
/// full the client is too slow and the frame is dropped for it.
#[derive(Debug)]
pub struct ConnectedClient {
    /// Unique connection identifier
    pub id: ConnectionId,
    /// Peer address, for logging only
    pub peer_addr: SocketAddr,
    tx: mpsc::Sender<Frame>,
}

impl ConnectedClient {
    /// Create a client around its outbound frame queue
    pub fn new(id: ConnectionId, peer_addr: SocketAddr, tx: mpsc::Sender<Frame>) -> Self {
        Self { id, peer_addr, tx }
    }

    /// Offer a frame to this client; false when dropped (queue full or gone)
    pub fn send(&self, frame: Frame) -> bool {
        self.tx.try_send(frame).is_ok()
    }
}

/// Registry of all live connections
///
/// Accept and disconnect events mutate the registry independently of the
/// broadcast path; a write failure never evicts a client.
#[derive(Debug, Default)]
pub struct ClientManager {
    clients: RwLock<HashMap<ConnectionId, ConnectedClient>>,
    joined: AtomicBool,
}

impl ClientManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; it receives broadcasts immediately
    pub fn add_client(&self, client: ConnectedClient) {
        let peer = client.peer_addr;
        self.clients.write().insert(client.id, client);
        self.joined.store(true, Ordering::Release);
        log::info!(
            "Client {} connected, total clients: {}",
            peer,
            self.client_count()
        );
    }

    /// Remove a connection; safe to call for an id already gone
    pub fn remove_client(&self, id: &ConnectionId) -> Option<ConnectedClient> {
        let client = self.clients.write().remove(id);
        if let Some(ref client) = client {
            log::info!(
                "Client {} disconnected, total clients: {}",
                client.peer_addr,
                self.client_count()
            );
        }
        client
    }

    /// Number of live connections
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Take the joined-since-last-broadcast flag
    ///
    /// The dispatcher turns this into a header request so a text-mode client
    /// connecting mid-stream gets a header with its first frame.
    pub fn take_joined(&self) -> bool {
        self.joined.swap(false, Ordering::AcqRel)
    }

    /// Offer the same frame to every live connection
    ///
    /// Returns how many connections accepted it. Clients whose queue is full
    /// miss this frame silently; there is no retry and no eviction.
    pub fn broadcast(&self, frame: Frame) -> usize {
        let clients = self.clients.read();
        let mut delivered = 0;
        for client in clients.values() {
            if client.send(Arc::clone(&frame)) {
                delivered += 1;
            } else {
                log::trace!("Dropping frame for slow client {}", client.peer_addr);
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(capacity: usize) -> (ConnectedClient, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity);
        let client = ConnectedClient::new(Uuid::new_v4(), "127.0.0.1:9999".parse().unwrap(), tx);
        (client, rx)
    }

    #[test]
    fn test_add_and_remove() {
        let manager = ClientManager::new();
        let (client, _rx) = test_client(4);
        let id = client.id;

        manager.add_client(client);
        assert_eq!(manager.client_count(), 1);

        assert!(manager.remove_client(&id).is_some());
        assert_eq!(manager.client_count(), 0);

        // Second removal of the same id is a no-op.
        assert!(manager.remove_client(&id).is_none());
    }

    #[test]
    fn test_broadcast_reaches_every_client() {
        let manager = ClientManager::new();
        let (first, mut rx1) = test_client(4);
        let (second, mut rx2) = test_client(4);
        manager.add_client(first);
        manager.add_client(second);

        let frame: Frame = Arc::from(vec![1u8, 2, 3].into_boxed_slice());
        assert_eq!(manager.broadcast(Arc::clone(&frame)), 2);

        assert_eq!(rx1.try_recv().unwrap().as_ref(), frame.as_ref());
        assert_eq!(rx2.try_recv().unwrap().as_ref(), frame.as_ref());
    }

    #[test]
    fn test_full_queue_drops_frame_without_eviction() {
        let manager = ClientManager::new();
        let (client, mut rx) = test_client(1);
        manager.add_client(client);

        let frame: Frame = Arc::from(vec![0u8].into_boxed_slice());
        assert_eq!(manager.broadcast(Arc::clone(&frame)), 1);
        assert_eq!(manager.broadcast(Arc::clone(&frame)), 0);
        assert_eq!(manager.client_count(), 1);

        // Draining the queue makes the client reachable again.
        rx.try_recv().unwrap();
        assert_eq!(manager.broadcast(frame), 1);
    }

    #[test]
    fn test_joined_flag_is_one_shot() {
        let manager = ClientManager::new();
        assert!(!manager.take_joined());

        let (client, _rx) = test_client(1);
        manager.add_client(client);
        assert!(manager.take_joined());
        assert!(!manager.take_joined());
    }
}
