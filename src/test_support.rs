//! In-process HTTP stub for gateway tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use crate::config::Config;

type Route = (&'static str, u16, &'static str);

/// Answers each request with the first route whose path prefix matches, 404 otherwise.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        Self::spawn(Some(routes)).await
    }

    /// a server that reads requests but never answers them
    pub async fn hanging() -> Self {
        Self::spawn(None).await
    }

    async fn spawn(routes: Option<Vec<Route>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    handle(socket, routes, seen).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// raw request heads received so far
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

async fn handle(mut socket: TcpStream, routes: Option<Vec<Route>>, seen: Arc<Mutex<Vec<String>>>) {
    let head = read_head(&mut socket).await;
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    seen.lock().await.push(head);

    let Some(routes) = routes else {
        // keep the connection open until the test runtime goes away
        let _socket = socket;
        std::future::pending::<()>().await;
        return;
    };

    let (status, body) = routes.iter()
        .find(|(prefix, _, _)| path.starts_with(prefix))
        .map(|(_, status, body)| (*status, *body))
        .unwrap_or((404, "not found"));
    let resp = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(resp.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn test_config(server: &StubServer) -> Config {
    Config::new(
        Some(server.url()),
        Some("test-key".to_string()),
        Some(format!("{}/geocode", server.url())),
    )
        .unwrap()
        .with_request_timeout(Duration::from_secs(5))
}
