//! Raw TCP upstreams for timing tests that mockito cannot express.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const USDBRL_BODY: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"US Dollar to Brazilian Real","high":"5.50","low":"5.40","varBid":"0.10","pctChange":"1.85","bid":"5.45","ask":"5.55","timestamp":"1718900000","create_date":"2024-06-20 13:33:20"}}"#;

const PATH: &str = "/json/last/USD-BRL";

/// Accepts connections and never writes a byte back.
pub async fn silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();

        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("http://{}{}", addr, PATH)
}

/// Answers every request with `body` after `delay`.
pub async fn delayed_upstream(delay: Duration, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;

                tokio::time::sleep(delay).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{}{}", addr, PATH)
}

/// Sends the headers and the start of the body, then stops writing.
///
/// The advertised `content-length` is larger than what is sent.
pub async fn stalled_body_upstream(partial: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();

        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;

            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                partial.len() + 500,
                partial
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.flush().await;

            held.push(stream);
        }
    });

    format!("http://{}{}", addr, PATH)
}

/// Address with nothing listening on it.
pub async fn refused_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    drop(listener);

    format!("http://{}{}", addr, PATH)
}
