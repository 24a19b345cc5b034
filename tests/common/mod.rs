//! Shared test utilities

#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Read one HTTP request from the socket: headers plus a content-length body
pub async fn read_http_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await.expect("request read failed");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if let Some(header_end) = find_subslice(&data, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..header_end]).to_string();
            let content_length = headers.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            });
            match content_length {
                Some(len) if data.len() >= header_end + 4 + len => break,
                None => break,
                Some(_) => {}
            }
        }
    }

    data
}

/// Body portion of a raw HTTP request
pub fn request_body(request: &[u8]) -> &[u8] {
    find_subslice(request, b"\r\n\r\n").map_or(&[], |pos| &request[pos + 4..])
}

/// Write a minimal JSON HTTP response and close the connection
pub async fn write_json_response(socket: &mut TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    socket
        .write_all(head.as_bytes())
        .await
        .expect("response head write failed");
    socket
        .write_all(body)
        .await
        .expect("response body write failed");
    socket.flush().await.expect("response flush failed");
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
