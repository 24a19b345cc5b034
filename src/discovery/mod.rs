//! Camera discovery over UDP broadcast
//!
//! A camera on the local network periodically broadcasts a beacon datagram
//! advertising where its MJPEG stream can be fetched. This module decodes
//! those beacons and tracks the most recent endpoint.

mod beacon;
mod listener;

pub use beacon::{DISCOVERY_PORT, Endpoint, decode_beacon};
pub use listener::DiscoveryService;
