//! Discovery listener integration tests
//!
//! Exercise a real `DiscoveryService` bound on loopback with datagrams sent
//! from a plain UDP socket.

use std::time::Duration;

use tokio::net::UdpSocket;

use spectacle::DiscoveryService;

mod common;

async fn send_datagram(port: u16, payload: &[u8]) {
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(payload, ("127.0.0.1", port)).await.unwrap();
}

/// Poll until the published endpoint host matches, or time out
async fn await_host(service: &DiscoveryService, host: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if service
                .endpoint()
                .is_some_and(|endpoint| endpoint.host == host)
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("endpoint for {host} was never published"));
}

#[tokio::test]
async fn test_beacon_resolves_endpoint() {
    let service = DiscoveryService::bind(0).await.unwrap();
    let port = service.local_addr().port();

    send_datagram(port, br#"{"ip":"10.0.0.5","port":8081,"path":"/video"}"#).await;
    await_host(&service, "10.0.0.5").await;

    let endpoint = service.endpoint().unwrap();
    assert_eq!(endpoint.port, 8081);
    assert_eq!(endpoint.path, "/video");

    service.stop();
}

#[tokio::test]
async fn test_malformed_beacon_does_not_kill_listener() {
    let service = DiscoveryService::bind(0).await.unwrap();
    let port = service.local_addr().port();

    // Garbage, then a beacon missing its port, then a valid beacon.
    send_datagram(port, b"\xFF\xFEnot json").await;
    send_datagram(port, br#"{"ip":"10.0.0.5","path":"/video"}"#).await;
    send_datagram(port, br#"{"ip":"10.0.0.9","port":8081,"path":"/"}"#).await;

    await_host(&service, "10.0.0.9").await;
    service.stop();
}

#[tokio::test]
async fn test_last_beacon_wins() {
    let service = DiscoveryService::bind(0).await.unwrap();
    let port = service.local_addr().port();

    send_datagram(port, br#"{"ip":"10.0.0.5","port":8081,"path":"/video"}"#).await;
    await_host(&service, "10.0.0.5").await;

    send_datagram(port, br#"{"ip":"10.0.0.6","port":9090,"path":"/cam"}"#).await;
    await_host(&service, "10.0.0.6").await;

    let endpoint = service.endpoint().unwrap();
    assert_eq!(endpoint.port, 9090);
    assert_eq!(endpoint.path, "/cam");

    service.stop();
}

#[tokio::test]
async fn test_stop_suppresses_further_publications() {
    let service = DiscoveryService::bind(0).await.unwrap();
    let port = service.local_addr().port();

    service.stop();
    // Give the abort a moment to land before sending.
    tokio::time::sleep(Duration::from_millis(50)).await;

    send_datagram(port, br#"{"ip":"10.0.0.5","port":8081,"path":"/video"}"#).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(service.endpoint().is_none());
}
