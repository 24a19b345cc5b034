//! Discovery beacon decoding
//!
//! Cameras announce themselves by broadcasting a small UTF-8 JSON datagram:
//! `{"ip": "10.0.0.5", "port": 8081, "path": "/video"}`. Real senders add
//! extra fields (`svc`, `name`, `ver`); those are ignored.

use std::fmt;

use serde::Deserialize;

use crate::{Error, Result};

/// Well-known UDP port cameras broadcast beacons on
pub const DISCOVERY_PORT: u16 = 19999;

/// Resolved stream endpoint advertised by a camera beacon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host address of the stream server
    pub host: String,
    /// TCP port of the stream server
    pub port: u16,
    /// Request path of the stream resource
    pub path: String,
}

impl Endpoint {
    /// Full HTTP URL of the live stream
    #[must_use]
    pub fn stream_url(&self) -> String {
        if self.path.starts_with('/') {
            format!("http://{}:{}{}", self.host, self.port, self.path)
        } else {
            format!("http://{}:{}/{}", self.host, self.port, self.path)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.host, self.port, self.path)
    }
}

/// Wire shape of a discovery beacon
#[derive(Debug, Deserialize)]
struct BeaconPayload {
    ip: String,
    port: u16,
    path: String,
}

/// Decode a raw UDP datagram into a stream endpoint
///
/// # Errors
///
/// Returns [`Error::MalformedBeacon`] if the datagram is not the expected
/// UTF-8 JSON shape or a required field is missing.
pub fn decode_beacon(datagram: &[u8]) -> Result<Endpoint> {
    let payload: BeaconPayload =
        serde_json::from_slice(datagram).map_err(|e| Error::MalformedBeacon(e.to_string()))?;

    Ok(Endpoint {
        host: payload.ip,
        port: payload.port,
        path: payload.path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_beacon() {
        let endpoint =
            decode_beacon(br#"{"ip":"10.0.0.5","port":8081,"path":"/video"}"#).unwrap();

        assert_eq!(endpoint.host, "10.0.0.5");
        assert_eq!(endpoint.port, 8081);
        assert_eq!(endpoint.path, "/video");
        assert_eq!(endpoint.stream_url(), "http://10.0.0.5:8081/video");
    }

    #[test]
    fn test_decode_beacon_with_extra_fields() {
        let datagram = br#"{"svc":"mjpeg","name":"NiclaVision","ip":"192.168.86.47","port":8081,"path":"/","ver":1}"#;
        let endpoint = decode_beacon(datagram).unwrap();

        assert_eq!(endpoint.host, "192.168.86.47");
        assert_eq!(endpoint.stream_url(), "http://192.168.86.47:8081/");
    }

    #[test]
    fn test_decode_beacon_missing_port_is_rejected() {
        let err = decode_beacon(br#"{"ip":"10.0.0.5","path":"/video"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedBeacon(_)));
    }

    #[test]
    fn test_decode_beacon_not_json() {
        assert!(decode_beacon(b"not json at all").is_err());
        assert!(decode_beacon(&[0xFF, 0xFE, 0x00]).is_err());
    }

    #[test]
    fn test_stream_url_normalizes_missing_slash() {
        let endpoint = Endpoint {
            host: "camera.local".to_string(),
            port: 8081,
            path: "video".to_string(),
        };
        assert_eq!(endpoint.stream_url(), "http://camera.local:8081/video");
    }
}
