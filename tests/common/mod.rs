//! One-shot HTTP server for exercising the API client against real sockets.
#![allow(dead_code)]

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Path the client is pointed at
pub const HOMEWORK_PATH: &str = "/api/user_api/homework_statuses/";

/// Server answering exactly one request with a canned response
pub struct OneShotServer {
    /// Full endpoint URL including [`HOMEWORK_PATH`]
    pub endpoint: String,
    /// Resolves to the raw request head once it was served
    pub request: JoinHandle<Result<String>>,
}

/// Starts a server that replies with `status_line` and `body`.
pub async fn serve_once(status_line: &'static str, body: &'static str) -> Result<OneShotServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = format!("http://{}{HOMEWORK_PATH}", listener.local_addr()?);

    let request = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        let mut head = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await?;
        socket.shutdown().await?;
        Ok::<_, anyhow::Error>(String::from_utf8_lossy(&head).into_owned())
    });

    Ok(OneShotServer { endpoint, request })
}

/// Endpoint on a port nothing listens on.
pub async fn refused_endpoint() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}{HOMEWORK_PATH}"))
}
