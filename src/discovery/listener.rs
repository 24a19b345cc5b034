//! UDP broadcast discovery listener
//!
//! Listens for camera beacons on a well-known port and publishes the most
//! recently resolved endpoint. Discovery is best-effort: malformed datagrams
//! are dropped silently and noisy networks are expected. No deduplication
//! and no ordering beyond arrival order; the last parsed beacon wins.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::beacon::{Endpoint, decode_beacon};
use crate::Result;

/// Largest datagram we accept; beacons are well under this
const MAX_DATAGRAM: usize = 2048;

/// Receives camera beacons and publishes the latest resolved endpoint
///
/// The listener runs on a background task until [`stop`](Self::stop) is
/// called or the service is dropped; stopping releases the socket and
/// suppresses further publications.
pub struct DiscoveryService {
    endpoint_rx: watch::Receiver<Option<Endpoint>>,
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl DiscoveryService {
    /// Bind the discovery socket and start listening for beacons
    ///
    /// Pass port 0 to let the OS pick (useful in tests); production callers
    /// use [`DISCOVERY_PORT`](super::DISCOVERY_PORT).
    ///
    /// # Errors
    ///
    /// Returns error if the socket cannot be bound.
    pub async fn bind(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
        socket.set_broadcast(true)?;
        let local_addr = socket.local_addr()?;

        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(listen(socket, tx));

        tracing::info!(%local_addr, "discovery listener bound");

        Ok(Self {
            endpoint_rx: rx,
            local_addr,
            task,
        })
    }

    /// The most recently resolved endpoint, if any beacon has arrived yet
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.endpoint_rx.borrow().clone()
    }

    /// Subscribe to endpoint updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Endpoint>> {
        self.endpoint_rx.clone()
    }

    /// Address the listener is bound to
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop listening, releasing the socket
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for DiscoveryService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Receive loop: decode each datagram, publish on success, drop on failure
async fn listen(socket: UdpSocket, tx: watch::Sender<Option<Endpoint>>) {
    let mut buf = [0u8; MAX_DATAGRAM];

    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, peer)) => match decode_beacon(&buf[..len]) {
                Ok(endpoint) => {
                    tracing::debug!(%endpoint, %peer, "beacon received");
                    tx.send_replace(Some(endpoint));
                }
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "malformed beacon dropped");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "discovery socket error, listener stopping");
                break;
            }
        }
    }
}
