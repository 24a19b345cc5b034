//! Stream session integration tests
//!
//! Drive a real `StreamSession` against loopback TCP servers that speak
//! just enough HTTP to deliver an MJPEG-style body.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use spectacle::{StreamOptions, StreamSession};

mod common;

const FRAME_A: &[u8] = &[0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
const FRAME_B: &[u8] = &[0xFF, 0xD8, 0x03, 0xFF, 0xD9];

const STREAM_HEAD: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Content-Type: multipart/x-mixed-replace;boundary=frame\r\n\
    Connection: close\r\n\r\n";

/// Serve one connection that streams `payload` in tiny chunks, then closes
async fn serve_stream(payload: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;

        socket.write_all(STREAM_HEAD).await.unwrap();
        for chunk in payload.chunks(3) {
            socket.write_all(chunk).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        // Give the client a moment to drain before the close.
        tokio::time::sleep(Duration::from_millis(100)).await;
    });

    format!("http://{addr}/video")
}

/// Wait until the session publishes a frame matching `expected`
async fn await_frame(session: &StreamSession, expected: &[u8]) {
    let mut frames = session.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            frames.changed().await.unwrap();
            let latest = frames.borrow_and_update().clone();
            if latest.is_some_and(|frame| frame.data() == expected) {
                break;
            }
        }
    })
    .await
    .expect("expected frame did not arrive in time");
}

#[tokio::test]
async fn test_session_demuxes_chunked_stream() {
    let mut payload = Vec::new();
    payload.extend_from_slice(FRAME_A);
    payload.push(0xAA); // stray inter-frame byte
    payload.extend_from_slice(FRAME_B);

    let url = serve_stream(payload).await;
    let session = StreamSession::connect(url, StreamOptions::default());

    await_frame(&session, FRAME_B).await;
    assert_eq!(session.latest_frame().unwrap().data(), FRAME_B);

    session.stop();
}

#[tokio::test]
async fn test_unreachable_server_yields_no_frames() {
    // Bind then drop to get a port that refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = StreamSession::connect(format!("http://{addr}/video"), StreamOptions::default());
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(session.latest_frame().is_none());
    session.stop();
}

#[tokio::test]
async fn test_session_reconnects_after_stream_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Two connections, one frame each; the session must come back for the
    // second after the first closes.
    tokio::spawn(async move {
        for frame in [FRAME_A, FRAME_B] {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;

            socket.write_all(STREAM_HEAD).await.unwrap();
            socket.write_all(frame).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });

    let options = StreamOptions {
        initial_backoff: Duration::from_millis(50),
        ..StreamOptions::default()
    };
    let session = StreamSession::connect(format!("http://{addr}/video"), options);

    await_frame(&session, FRAME_A).await;
    await_frame(&session, FRAME_B).await;

    session.stop();
}
